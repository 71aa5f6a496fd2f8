//! MIコマンドの結果の解釈

use crate::breakpoint::{break_info, Breakpoint};
use crate::errors::Error;
use crate::frame::{stack_info_frame, StackFrame};
use crate::source::{exec_source_file, exec_source_files, CurrentSourceFile, SourceFile};
use crate::Result;
use mikan_wire::{ResultClass, ResultRecord};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// 結果を解釈できるMIコマンドの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    /// `-break-info`
    BreakInfo,
    /// `-stack-info-frame`
    StackInfoFrame,
    /// `-file-list-exec-source-file`
    FileListExecSourceFile,
    /// `-file-list-exec-source-files`
    FileListExecSourceFiles,
}

/// 解釈済みのコマンド結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MiCommand {
    BreakInfo { breakpoints: Vec<Breakpoint> },
    StackInfoFrame { frame: StackFrame },
    FileListExecSourceFile(CurrentSourceFile),
    FileListExecSourceFiles { files: Vec<SourceFile> },
}

impl CommandKind {
    /// 全ての種類
    pub const ALL: [CommandKind; 4] = [
        CommandKind::BreakInfo,
        CommandKind::StackInfoFrame,
        CommandKind::FileListExecSourceFile,
        CommandKind::FileListExecSourceFiles,
    ];

    /// 先頭の `-` を除いたMIコマンド名
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandKind::BreakInfo => "break-info",
            CommandKind::StackInfoFrame => "stack-info-frame",
            CommandKind::FileListExecSourceFile => "file-list-exec-source-file",
            CommandKind::FileListExecSourceFiles => "file-list-exec-source-files",
        }
    }
}

impl FromStr for CommandKind {
    type Err = Error;

    /// `-break-info` と `break-info` のどちらの形式も受け付ける
    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim();
        let name = name.strip_prefix('-').unwrap_or(name);
        CommandKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == name)
            .ok_or_else(|| Error::UnsupportedCommand(s.to_string()))
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "-{}", self.as_str())
    }
}

impl MiCommand {
    pub fn kind(&self) -> CommandKind {
        match self {
            MiCommand::BreakInfo { .. } => CommandKind::BreakInfo,
            MiCommand::StackInfoFrame { .. } => CommandKind::StackInfoFrame,
            MiCommand::FileListExecSourceFile(_) => CommandKind::FileListExecSourceFile,
            MiCommand::FileListExecSourceFiles { .. } => CommandKind::FileListExecSourceFiles,
        }
    }
}

/// `kind` のコマンドに対する結果レコードを解釈する
///
/// 結果クラスが `^done` でなければ `Error::UnexpectedResultClass`、
/// 形が想定と違えば `Error::Schema` を返します。
pub fn extract(kind: CommandKind, record: &ResultRecord) -> Result<MiCommand> {
    if record.result_class != ResultClass::Done {
        return Err(Error::UnexpectedResultClass(record.result_class));
    }

    let command = match kind {
        CommandKind::BreakInfo => MiCommand::BreakInfo {
            breakpoints: break_info(record)?,
        },
        CommandKind::StackInfoFrame => MiCommand::StackInfoFrame {
            frame: stack_info_frame(record)?,
        },
        CommandKind::FileListExecSourceFile => {
            MiCommand::FileListExecSourceFile(exec_source_file(record)?)
        }
        CommandKind::FileListExecSourceFiles => MiCommand::FileListExecSourceFiles {
            files: exec_source_files(record)?,
        },
    };

    debug!("extracted {} result", kind);
    Ok(command)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mikan_wire::parse_line;

    fn record(line: &str) -> ResultRecord {
        parse_line(line).unwrap().as_result().cloned().expect("result record")
    }

    #[test]
    fn test_parse_command_kind() {
        assert_eq!("-break-info".parse::<CommandKind>().unwrap(), CommandKind::BreakInfo);
        assert_eq!("break-info".parse::<CommandKind>().unwrap(), CommandKind::BreakInfo);
        assert_eq!(
            " -file-list-exec-source-files ".parse::<CommandKind>().unwrap(),
            CommandKind::FileListExecSourceFiles
        );
        assert!(matches!(
            "-exec-run".parse::<CommandKind>(),
            Err(Error::UnsupportedCommand(name)) if name == "-exec-run"
        ));
    }

    #[test]
    fn test_display_round_trip() {
        for kind in CommandKind::ALL {
            assert_eq!(kind.to_string().parse::<CommandKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_error_class_is_rejected() {
        let err = extract(
            CommandKind::StackInfoFrame,
            &record(r#"^error,msg="No stack.""#),
        )
        .unwrap_err();
        assert!(matches!(err, Error::UnexpectedResultClass(ResultClass::Error)));
    }

    #[test]
    fn test_extract_kind_matches() {
        let command = extract(
            CommandKind::FileListExecSourceFile,
            &record(r#"^done,line="3",file="main.c""#),
        )
        .unwrap();
        assert_eq!(command.kind(), CommandKind::FileListExecSourceFile);
    }
}
