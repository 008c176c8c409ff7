//! インドネシア語の語根辞書。ステマーが過剰な接辞除去を止めるために使う。
use rustc_hash::FxHashSet;

/// 組み込みの語根一覧。ニュース記事に頻出し、接頭辞と見分けにくい綴りの語根を優先して収録している。
pub const INDONESIAN_ROOT_WORDS: &[&str] = &[
    "abadi", "acara", "adat", "adil", "agama", "ahli", "air", "ajak", "ajar", "akal", "akhir",
    "akibat", "aksi", "aktif", "akun", "alam", "alamat", "alasan", "alat", "aman", "ambil", "anak",
    "ancam", "anggap", "anggaran", "anggota", "angka", "angkat", "angkut", "aniaya", "antar",
    "antre", "apresiasi", "arah", "arsip", "arti", "asing", "asli", "asuransi", "atur", "awas",
    "badan", "bahan", "bahas", "bahaya", "baik", "bakar", "balas", "bangsa", "bangun", "banjir",
    "bantah", "bantu", "bayar", "bebas", "beda", "bekal", "bela", "beli", "benar", "bencana",
    "bentuk", "berani", "beras", "berat", "beri", "berita", "berkas", "bersih", "besar", "betul",
    "biasa", "bicara", "bijak", "bina", "bisnis", "bocor", "bohong", "bom", "bongkar", "buat",
    "budaya", "bukti", "buku", "bunuh", "buruh", "buruk", "butuh", "cabut", "cair", "calon",
    "cari", "catat", "cegah", "cek", "cemar", "cepat", "cerita", "cetak", "cinta", "cipta", "cium",
    "cocok", "contoh", "curang", "curi", "daftar", "daging", "dampak", "dana", "dapat", "darah",
    "darurat", "data", "datang", "dekat", "demokrasi", "desa", "dewan", "dewasa", "diam", "didik",
    "digital", "dinas", "dinding", "dingin", "diplomasi", "direktur", "disinformasi",
    "diskriminasi", "diskusi", "distribusi", "dokter", "dorong", "duduk", "duga", "dukung",
    "dunia", "edar", "edukasi", "ekonomi", "energi", "fakta", "fitnah", "foto", "fungsi", "gagal",
    "gambar", "ganggu", "ganti", "gelar", "gempa", "gerak", "gizi", "gratis", "guna", "guru",
    "hadap", "hadir", "hak", "hakim", "hancur", "harap", "harga", "hari", "hasil", "hebat",
    "hemat", "hidup", "hilang", "hina", "hitung", "hoaks", "hubung", "hujan", "hukum", "hutan",
    "ikut", "ilmu", "imbau", "impor", "indah", "informasi", "ingat", "ingin", "isi", "istri",
    "izin", "jabat", "jadi", "jadwal", "jaga", "jalan", "jamin", "janji", "jaring", "jawab",
    "jelas", "jual", "juang", "kabar", "kaji", "kandung", "kantor", "kapal", "karya", "kata",
    "kawal", "kebun", "kecil", "kehendak", "kejar", "kejut", "kelas", "kelompok", "keluarga",
    "keluh", "kembali", "kena", "kenal", "kendara", "kepala", "keras", "kereta", "kertas", "kesal",
    "khusus", "kirim", "klaim", "klarifikasi", "korban", "kota", "kritik", "kuasa", "kuat",
    "kumpul", "kurang", "lahir", "lain", "laku", "lalu", "lambat", "lampau", "lanjut", "lapor",
    "larang", "latih", "lawan", "layan", "lebih", "lemah", "lepas", "lewat", "lihat", "lindung",
    "lingkung", "lomba", "luar", "luas", "lupa", "maju", "makan", "malu", "mampu", "mandi",
    "manfaat", "marah", "masalah", "masuk", "mati", "media", "medis", "mekanisme", "menang",
    "menantu", "menit", "mental", "menteri", "merah", "merdeka", "merek", "mesin", "meter",
    "metode", "milik", "minta", "minum", "miskin", "modal", "muda", "mudah", "mulai", "muncul",
    "murah", "musim", "nama", "nasional", "negara", "nikah", "nilai", "nyata", "obat", "olah",
    "operasi", "orang", "otak", "pajak", "pakai", "paksa", "palsu", "panas", "pandang", "pangan",
    "panggil", "pantau", "partai", "pasar", "pasti", "patuh", "peduli", "peluru", "pemilu",
    "pendek", "pendeta", "pengantin", "penjara", "penting", "penuh", "peran", "perang",
    "perangkat", "perempuan", "pergi", "perintah", "peristiwa", "perkara", "pers", "persen",
    "pertama", "perut", "pesan", "pesawat", "pikir", "pilih", "pimpin", "pindah", "pinjam",
    "polisi", "politik", "potong", "presiden", "proses", "pukul", "pulang", "pulih", "pungut",
    "pusat", "putus", "rahasia", "rakyat", "rancang", "rasa", "rawat", "rekam", "resmi", "ribut",
    "rugi", "rumah", "rusak", "sakit", "salah", "salur", "sama", "sampai", "sapu", "saran", "satu",
    "sebab", "sebar", "sedia", "sehat", "sekolah", "selamat", "selesai", "semangat", "sembuh",
    "sempat", "senang", "serang", "sesuai", "siap", "siar", "sidang", "simpan", "sinyal", "situs",
    "suara", "sulit", "sumbang", "sunting", "syarat", "tahan", "tahu", "takut", "tambah", "tampil",
    "tanam", "tanda", "tangan", "tangkap", "tanya", "tarik", "tawar", "teknologi", "teliti",
    "teman", "temu", "tentang", "terang", "terap", "terapi", "terima", "teror", "teroris",
    "tertib", "tiba", "tiket", "tindak", "tinggal", "tipu", "tolak", "tolong", "tuduh", "tugas",
    "tuju", "tulis", "tunda", "tunjuk", "tutup", "uang", "ubah", "ucap", "ujar", "uji", "ukur",
    "ulang", "umum", "undang", "untung", "upaya", "urus", "usaha", "usul", "utama", "vaksin",
    "viral", "virus", "wajib", "wakil", "warga", "waspada", "wilayah",
];

/// 不変の語根集合。
#[derive(Debug, Clone)]
pub struct RootWords {
    words: FxHashSet<String>,
}

impl RootWords {
    #[must_use]
    pub fn indonesian() -> Self {
        Self::new(INDONESIAN_ROOT_WORDS)
    }

    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .map(|word| word.as_ref().trim().to_lowercase())
            .filter(|word| !word.is_empty())
            .collect();
        Self { words }
    }

    #[must_use]
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl Default for RootWords {
    fn default() -> Self {
        Self::indonesian()
    }
}
