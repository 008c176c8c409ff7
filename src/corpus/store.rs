//! コーパス CSV の読み書き。
//!
//! 生データは `Judul, Link, Tanggal, Author, Isi Ringkas`、正規化済みデータは
//! それに `Isi Ringkas Clean` を加えた列を持つ。`Judul` と本文列以外は欠けていてもよい。
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord, Writer};
use tracing::debug;

use super::{NormalizedArticle, RawArticle};
use crate::error::DataError;

pub const TITLE: &str = "Judul";
pub const LINK: &str = "Link";
pub const PUBLISHED: &str = "Tanggal";
pub const AUTHOR: &str = "Author";
pub const EXCERPT: &str = "Isi Ringkas";
pub const CLEAN_EXCERPT: &str = "Isi Ringkas Clean";

/// 正規化済みファイルの接尾辞。
pub const CLEANED_SUFFIX: &str = "_cleaned.csv";

/// ヘッダ名から列位置を引く。
struct Columns {
    title: usize,
    link: Option<usize>,
    published: Option<usize>,
    author: Option<usize>,
    excerpt: Option<usize>,
    clean_excerpt: Option<usize>,
}

impl Columns {
    fn resolve(headers: &StringRecord, path: &Path, required: &[&'static str]) -> Result<Self, DataError> {
        let names: Vec<&str> = headers
            .iter()
            .map(|name| name.trim_start_matches('\u{feff}').trim())
            .collect();
        let find = |column: &str| names.iter().position(|name| *name == column);

        if let Some(&column) = required.iter().find(|column| find(column).is_none()) {
            return Err(DataError::MissingColumn {
                column,
                path: path.to_path_buf(),
            });
        }

        Ok(Self {
            title: find(TITLE).ok_or_else(|| DataError::MissingColumn {
                column: TITLE,
                path: path.to_path_buf(),
            })?,
            link: find(LINK),
            published: find(PUBLISHED),
            author: find(AUTHOR),
            excerpt: find(EXCERPT),
            clean_excerpt: find(CLEAN_EXCERPT),
        })
    }

    fn article(&self, record: &StringRecord) -> RawArticle {
        RawArticle {
            title: field(record, Some(self.title)),
            link: field(record, self.link),
            published: field(record, self.published),
            author: field(record, self.author),
            excerpt: field(record, self.excerpt),
        }
    }
}

fn field(record: &StringRecord, index: Option<usize>) -> String {
    index
        .and_then(|index| record.get(index))
        .unwrap_or_default()
        .to_string()
}

fn read_records(
    path: &Path,
    required: &[&'static str],
) -> Result<(Columns, Vec<StringRecord>), DataError> {
    let unreadable = |source: csv::Error| DataError::Unreadable {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(unreadable)?;
    let headers = reader.headers().map_err(unreadable)?.clone();
    let columns = Columns::resolve(&headers, path, required)?;
    let records = reader
        .records()
        .collect::<Result<Vec<_>, _>>()
        .map_err(unreadable)?;
    debug!(path = %path.display(), rows = records.len(), "read corpus file");
    Ok((columns, records))
}

/// スクレイパー出力の CSV を読む。
///
/// # Errors
/// ファイルが読めない場合、または `Judul` / `Isi Ringkas` 列がない場合。
pub fn read_raw(path: &Path) -> Result<Vec<RawArticle>, DataError> {
    let (columns, records) = read_records(path, &[TITLE, EXCERPT])?;
    Ok(records.iter().map(|record| columns.article(record)).collect())
}

/// 正規化済み CSV を読む。
///
/// # Errors
/// ファイルが読めない場合、または `Judul` / `Isi Ringkas Clean` 列がない場合。
pub fn read_normalized(path: &Path) -> Result<Vec<NormalizedArticle>, DataError> {
    let (columns, records) = read_records(path, &[TITLE, CLEAN_EXCERPT])?;
    Ok(records
        .iter()
        .map(|record| NormalizedArticle {
            article: columns.article(record),
            clean_excerpt: field(record, columns.clean_excerpt),
        })
        .collect())
}

/// 正規化済み記事を CSV に書き出す。
///
/// # Errors
/// ファイル作成または書き込みに失敗した場合。
pub fn write_normalized(path: &Path, articles: &[NormalizedArticle]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    let mut writer = Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    writer.write_record([TITLE, LINK, PUBLISHED, AUTHOR, EXCERPT, CLEAN_EXCERPT])?;
    for NormalizedArticle {
        article,
        clean_excerpt,
    } in articles
    {
        writer
            .write_record([
                &article.title,
                &article.link,
                &article.published,
                &article.author,
                &article.excerpt,
                clean_excerpt,
            ])
            .with_context(|| format!("failed to write {}", path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("failed to flush {}", path.display()))?;
    Ok(())
}

/// `dir` 直下で `suffix` で終わるファイルを名前順に列挙する。ディレクトリがなければ空。
///
/// # Errors
/// ディレクトリの読み取りに失敗した場合。
pub fn list_files(dir: &Path, suffix: &str) -> Result<Vec<PathBuf>, DataError> {
    let unreadable = |source: io::Error| DataError::UnreadableDirectory {
        path: dir.to_path_buf(),
        source,
    };
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(error) => return Err(unreadable(error)),
    };

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(unreadable)?.path();
        let matches = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.ends_with(suffix));
        if matches && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// `<stem>.csv` に対応する正規化済みファイル名 `<stem>_cleaned.csv`。
#[must_use]
pub fn cleaned_file_name(raw: &Path) -> String {
    let stem = raw
        .file_stem()
        .map_or_else(|| "corpus".into(), |stem| stem.to_string_lossy());
    format!("{stem}{CLEANED_SUFFIX}")
}

/// 正規化済みディレクトリの全ファイルを、ファイルごとに読み込む。
///
/// # Errors
/// ファイルが 1 つもない場合は [`DataError::NoCorpusFiles`]、それ以外は各ファイルの読み込みエラー。
pub fn load_normalized_dir(dir: &Path) -> Result<Vec<Vec<NormalizedArticle>>, DataError> {
    let files = list_files(dir, CLEANED_SUFFIX)?;
    if files.is_empty() {
        return Err(DataError::NoCorpusFiles(dir.to_path_buf()));
    }
    files.iter().map(|path| read_normalized(path)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(title: &str, excerpt: &str, clean: &str) -> NormalizedArticle {
        NormalizedArticle {
            article: RawArticle {
                title: title.to_string(),
                link: "https://example.com/a".to_string(),
                published: "2024-01-01".to_string(),
                author: "Redaksi".to_string(),
                excerpt: excerpt.to_string(),
            },
            clean_excerpt: clean.to_string(),
        }
    }

    #[test]
    fn normalized_files_round_trip_with_quoted_fields() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("turnbackhoax_cleaned.csv");
        let articles = vec![
            article("[SALAH] Video, banjir \"besar\"", "Isi, ringkas\nbaris dua", "video banjir"),
            article("Kompas: harga naik", "", ""),
        ];
        write_normalized(&path, &articles).expect("write");
        assert_eq!(read_normalized(&path).expect("read"), articles);
    }

    #[test]
    fn raw_files_tolerate_missing_optional_columns_and_bom() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("raw.csv");
        fs::write(&path, "\u{feff}Judul,Isi Ringkas\n[HOAX] klaim,isi berita\n").expect("write");

        let articles = read_raw(&path).expect("read");
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title, "[HOAX] klaim");
        assert_eq!(articles[0].excerpt, "isi berita");
        assert_eq!(articles[0].link, "");
    }

    #[test]
    fn missing_required_column_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("broken_cleaned.csv");
        fs::write(&path, "Judul,Isi Ringkas\nx,y\n").expect("write");

        match read_normalized(&path) {
            Err(DataError::MissingColumn { column, .. }) => assert_eq!(column, CLEAN_EXCERPT),
            other => panic!("expected missing column, got {other:?}"),
        }
    }

    #[test]
    fn lists_only_matching_files_in_name_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        for name in ["b_cleaned.csv", "a_cleaned.csv", "notes.txt", "c.csv"] {
            fs::write(dir.path().join(name), "Judul\n").expect("write");
        }
        let files = list_files(dir.path(), CLEANED_SUFFIX).expect("list");
        let names: Vec<_> = files
            .iter()
            .filter_map(|path| path.file_name()?.to_str())
            .collect();
        assert_eq!(names, ["a_cleaned.csv", "b_cleaned.csv"]);
    }

    #[test]
    fn missing_directory_has_no_corpus_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("absent");
        assert!(list_files(&missing, CLEANED_SUFFIX).expect("list").is_empty());
        assert!(matches!(
            load_normalized_dir(&missing),
            Err(DataError::NoCorpusFiles(_))
        ));
    }

    #[test]
    fn cleaned_name_keeps_the_source_stem() {
        assert_eq!(
            cleaned_file_name(Path::new("data/turnbackhoax.csv")),
            "turnbackhoax_cleaned.csv"
        );
    }
}
