//! GDBの実際の出力を使った `interpret` のテスト

use mikan_core::{
    interpret, BreakpointAddress, CommandKind, Disposition, Error, MiCommand, ResultClass,
};

/// GDB 8系の `-break-info`。複数箇所のブレークポイントの各箇所が `body` に並ぶ
const BREAK_INFO_FLAT: &str = concat!(
    "^done,BreakpointTable={nr_rows=\"2\",nr_cols=\"6\",",
    "hdr=[{width=\"7\",alignment=\"-1\",col_name=\"number\",colhdr=\"Num\"},",
    "{width=\"14\",alignment=\"-1\",col_name=\"type\",colhdr=\"Type\"},",
    "{width=\"4\",alignment=\"-1\",col_name=\"disp\",colhdr=\"Disp\"},",
    "{width=\"3\",alignment=\"-1\",col_name=\"enabled\",colhdr=\"Enb\"},",
    "{width=\"18\",alignment=\"-1\",col_name=\"addr\",colhdr=\"Address\"},",
    "{width=\"40\",alignment=\"2\",col_name=\"what\",colhdr=\"What\"}],",
    "body=[bkpt={number=\"1\",type=\"breakpoint\",disp=\"keep\",enabled=\"y\",",
    "addr=\"<MULTIPLE>\",times=\"1\",original-location=\"Point::draw\"},",
    "{number=\"1.1\",enabled=\"y\",addr=\"0x0000000000401136\",func=\"Point::draw()\",",
    "file=\"shapes.cc\",fullname=\"/src/shapes.cc\",line=\"10\",thread-groups=[\"i1\"]},",
    "{number=\"1.2\",enabled=\"y\",addr=\"0x0000000000401176\",func=\"Point::draw(int)\",",
    "file=\"shapes.cc\",fullname=\"/src/shapes.cc\",line=\"14\",thread-groups=[\"i1\"]},",
    "bkpt={number=\"2\",type=\"breakpoint\",disp=\"del\",enabled=\"y\",",
    "addr=\"0x0000000000401196\",func=\"main\",file=\"main.cc\",fullname=\"/src/main.cc\",",
    "line=\"22\",thread-groups=[\"i1\"],times=\"0\",original-location=\"main\"}]}\n",
);

#[test]
fn test_multi_location_breakpoint() {
    let MiCommand::BreakInfo { breakpoints } =
        interpret(BREAK_INFO_FLAT, CommandKind::BreakInfo).unwrap()
    else {
        panic!("expected break-info");
    };

    assert_eq!(breakpoints.len(), 2);
    let parent = &breakpoints[0];
    assert_eq!(parent.number, "1");
    assert!(parent.multi);
    assert_eq!(parent.address, Some(BreakpointAddress::Multiple));
    assert_eq!(parent.times, 1);
    assert_eq!(parent.multi_breakpoints.len(), 2);
    for (child, number) in parent.multi_breakpoints.iter().zip(["1.1", "1.2"]) {
        assert_eq!(child.number, number);
        assert!(child.from_multi);
        assert_eq!(child.multi_breakpoint.as_deref(), Some("1"));
        assert_eq!(child.disposition, Disposition::Unknown);
        assert_eq!(child.file.as_deref(), Some("shapes.cc"));
    }
    assert_eq!(parent.multi_breakpoints[1].line, 14);

    let temporary = &breakpoints[1];
    assert_eq!(temporary.disposition, Disposition::Delete);
    assert!(temporary.multi_breakpoints.is_empty());
    assert_eq!(temporary.multi_breakpoint, None);
}

#[test]
fn test_extracting_twice_is_equal() {
    let first = interpret(BREAK_INFO_FLAT, CommandKind::BreakInfo).unwrap();
    let second = interpret(BREAK_INFO_FLAT, CommandKind::BreakInfo).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_stack_info_frame() {
    let command = interpret(
        "^done,frame={level=\"0\",addr=\"0x0000555555555139\",func=\"main\",file=\"hello.c\",fullname=\"/home/user/hello.c\",line=\"4\",arch=\"i386:x86-64\"}\r\n",
        CommandKind::StackInfoFrame,
    )
    .unwrap();
    let MiCommand::StackInfoFrame { frame } = command else {
        panic!("expected stack-info-frame");
    };
    assert_eq!(frame.level, 0);
    assert_eq!(frame.pc(), Some(0x555555555139));
    assert_eq!(frame.line, 4);
}

#[test]
fn test_exec_source_files_without_trailing_newline() {
    let command = interpret(
        "^done,files=[{file=\"hello.c\",fullname=\"/home/user/hello.c\"},{file=\"/usr/include/stdio.h\",fullname=\"/usr/include/stdio.h\"}]",
        CommandKind::FileListExecSourceFiles,
    )
    .unwrap();
    let MiCommand::FileListExecSourceFiles { files } = command else {
        panic!("expected file-list-exec-source-files");
    };
    assert_eq!(files.len(), 2);
    assert_eq!(files[1].file, "/usr/include/stdio.h");
}

#[test]
fn test_error_result_class() {
    let err = interpret(
        "^error,msg=\"No symbol table is loaded.  Use the \\\"file\\\" command.\"\n",
        CommandKind::FileListExecSourceFile,
    )
    .unwrap_err();
    assert!(matches!(err, Error::UnexpectedResultClass(ResultClass::Error)));
}

#[test]
fn test_usage_errors() {
    let cases = [
        "",
        "(gdb)\n",
        "~\"text\"\n",
        "*stopped,reason=\"exited-normally\"\n",
        "not mi at all\n",
        "^done,line=\"1\",file=\"a.c\"\n(gdb)\n",
        "^done\n^done\n",
    ];
    for text in cases {
        assert!(
            matches!(
                interpret(text, CommandKind::FileListExecSourceFile),
                Err(Error::Usage(_))
            ),
            "input {:?}",
            text
        );
    }
}

#[test]
fn test_schema_error() {
    let err = interpret("^done,stack=[]\n", CommandKind::StackInfoFrame).unwrap_err();
    assert!(matches!(err, Error::Schema(_)));
}

#[test]
fn test_wrong_kind_field_is_schema_error() {
    let cases = [
        (
            "^done,frame={level=\"0\",addr=\"0x1\",line=[\"4\"]}\n",
            CommandKind::StackInfoFrame,
        ),
        ("^done,line=\"1\",file={}\n", CommandKind::FileListExecSourceFile),
        ("^done,line=\"1\",file=\"\"\n", CommandKind::FileListExecSourceFile),
    ];
    for (text, kind) in cases {
        assert!(
            matches!(interpret(text, kind), Err(Error::Schema(_))),
            "input {:?}",
            text
        );
    }
}
