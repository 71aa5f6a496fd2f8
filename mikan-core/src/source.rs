//! ソースファイル情報

use crate::errors::Error;
use crate::parse::{cstring_value, parse_flag, parse_unsigned};
use crate::Result;
use mikan_wire::{MiResult, ResultRecord};

/// ソースファイル
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// コンパイル時の相対パス（空にはならない）
    pub file: String,
    /// 絶対パス（GDBが解決できた場合）
    pub fullname: Option<String>,
}

/// 現在のソースファイル
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentSourceFile {
    pub source: SourceFile,
    pub line: u64,
    /// マクロ情報の有無（`macro-info` が出力された場合のみ）
    pub macro_info: Option<bool>,
}

/// `-file-list-exec-source-file` の結果を読む
///
/// ```text
/// ^done,line="1",file="hello.c",fullname="/src/hello.c",macro-info="0"
/// ```
pub fn exec_source_file(record: &ResultRecord) -> Result<CurrentSourceFile> {
    let mut line = None;
    let mut file = None;
    let mut fullname = None;
    let mut macro_info = None;

    for field in &record.results {
        let Some(name) = field.variable.as_deref() else {
            continue;
        };
        let value = move || cstring_value(name, field);
        match name {
            "line" => line = Some(value()?),
            "file" => file = Some(value()?),
            "fullname" => fullname = Some(value()?.to_string()),
            "macro-info" => macro_info = Some(parse_flag(name, value()?)?),
            _ => {}
        }
    }

    let line = line.ok_or_else(|| Error::schema("source file without 'line'"))?;
    let file = file
        .filter(|file| !file.is_empty())
        .ok_or_else(|| Error::schema("source file without 'file'"))?;
    Ok(CurrentSourceFile {
        source: SourceFile {
            file: file.to_string(),
            fullname,
        },
        line: parse_unsigned("line", line)?,
        macro_info,
    })
}

/// `-file-list-exec-source-files` の結果を読む
///
/// ```text
/// ^done,files=[{file="hello.c",fullname="/src/hello.c"},{file="/usr/include/stdio.h"}]
/// ```
pub fn exec_source_files(record: &ResultRecord) -> Result<Vec<SourceFile>> {
    let entries = match record.results.as_slice() {
        [files] if files.is_named("files") => files
            .as_list()
            .ok_or_else(|| Error::schema("'files' is not a list"))?,
        _ => return Err(Error::schema("expected a single 'files' result")),
    };
    entries.iter().map(source_file).collect()
}

fn source_file(entry: &MiResult) -> Result<SourceFile> {
    let fields = entry.as_tuple().ok_or_else(|| {
        Error::schema(format!(
            "source file entry is a {}, expected tuple",
            entry.value.kind_name()
        ))
    })?;

    let file = mikan_wire::value::find(fields, "file")
        .map(|field| cstring_value("file", field))
        .transpose()?
        .filter(|file| !file.is_empty())
        .ok_or_else(|| Error::schema("source file entry without 'file'"))?;
    let fullname = mikan_wire::value::find(fields, "fullname")
        .map(|field| cstring_value("fullname", field))
        .transpose()?;
    Ok(SourceFile {
        file: file.to_string(),
        fullname: fullname.map(str::to_string),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mikan_wire::parse_line;

    fn record(line: &str) -> ResultRecord {
        parse_line(line).unwrap().as_result().cloned().expect("result record")
    }

    #[test]
    fn test_exec_source_file() {
        let current = exec_source_file(&record(
            r#"^done,line="12",file="hello.c",fullname="/src/hello.c",macro-info="1""#,
        ))
        .unwrap();
        assert_eq!(current.line, 12);
        assert_eq!(current.source.file, "hello.c");
        assert_eq!(current.source.fullname.as_deref(), Some("/src/hello.c"));
        assert_eq!(current.macro_info, Some(true));
    }

    #[test]
    fn test_exec_source_file_without_macro_info() {
        let current = exec_source_file(&record(r#"^done,line="1",file="a.c""#)).unwrap();
        assert_eq!(current.macro_info, None);
        assert_eq!(current.source.fullname, None);
    }

    #[test]
    fn test_exec_source_file_errors() {
        assert!(matches!(
            exec_source_file(&record(r#"^done,line="1",file="a.c",macro-info="2""#)),
            Err(Error::Schema(_))
        ));
        assert!(matches!(
            exec_source_file(&record(r#"^done,file="a.c""#)),
            Err(Error::Schema(_))
        ));
        assert!(matches!(
            exec_source_file(&record(r#"^done,line="1""#)),
            Err(Error::Schema(_))
        ));
    }

    #[test]
    fn test_exec_source_file_empty_or_wrong_kind_file() {
        let cases = [
            r#"^done,line="1",file="""#,
            r#"^done,line="1",file={}"#,
            r#"^done,line=["1"],file="a.c""#,
            r#"^done,line="1",file="a.c",fullname=[]"#,
            r#"^done,line="1",file="a.c",macro-info={}"#,
        ];
        for line in cases {
            assert!(
                matches!(exec_source_file(&record(line)), Err(Error::Schema(_))),
                "input {:?}",
                line
            );
        }
    }

    #[test]
    fn test_exec_source_files() {
        let files = exec_source_files(&record(
            r#"^done,files=[{file="hello.c",fullname="/src/hello.c"},{file="/usr/include/stdio.h"}]"#,
        ))
        .unwrap();
        assert_eq!(
            files,
            vec![
                SourceFile {
                    file: "hello.c".to_string(),
                    fullname: Some("/src/hello.c".to_string()),
                },
                SourceFile {
                    file: "/usr/include/stdio.h".to_string(),
                    fullname: None,
                },
            ]
        );
    }

    #[test]
    fn test_exec_source_files_errors() {
        assert!(matches!(
            exec_source_files(&record(r#"^done,files=[{file=""}]"#)),
            Err(Error::Schema(_))
        ));
        assert!(matches!(
            exec_source_files(&record(r#"^done,files=["hello.c"]"#)),
            Err(Error::Schema(_))
        ));
        assert!(matches!(
            exec_source_files(&record(r#"^done,files={}"#)),
            Err(Error::Schema(_))
        ));
        assert!(matches!(
            exec_source_files(&record(r#"^done,files=[{file=["a.c"]}]"#)),
            Err(Error::Schema(_))
        ));
        assert!(matches!(
            exec_source_files(&record(r#"^done,files=[{file="a.c",fullname={}}]"#)),
            Err(Error::Schema(_))
        ));
        assert!(exec_source_files(&record(r#"^done,files=[]"#)).unwrap().is_empty());
    }
}
