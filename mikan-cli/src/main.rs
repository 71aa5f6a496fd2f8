//! Mikan CLI - コマンドラインインターフェース
//!
//! GDB/MIの出力を解析して表示する診断用ツール

use anyhow::{Context, Result};
use clap::builder::RangedU64ValueParser;
use clap::{ArgAction, Parser, Subcommand};
use mikan_core::{interpret, Breakpoint, CommandKind, MiCommand, Wire, WireEvent};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Mikan - GDB/MI output decoder
#[derive(Parser)]
#[command(name = "mikan")]
#[command(version = "0.1.0")]
#[command(about = "Decode GDB/MI output streams into typed records", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv). RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: WireCommand,
}

#[derive(Subcommand)]
enum WireCommand {
    /// Decode a stream of MI output and print one line per record
    Parse {
        /// File containing MI output (stdin if omitted)
        file: Option<PathBuf>,

        /// Number of bytes pushed into the decoder at a time
        #[arg(long, default_value_t = 4096, value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
        chunk_size: usize,
    },

    /// Interpret the output of a single MI command
    Interpret {
        /// MI command that produced the output (e.g. -break-info)
        #[arg(short, long, allow_hyphen_values = true)]
        command: CommandKind,

        /// File containing the command output (stdin if omitted)
        file: Option<PathBuf>,
    },

    /// Type MI output lines interactively
    Repl,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        WireCommand::Parse { file, chunk_size } => run_parse(file.as_deref(), chunk_size),
        WireCommand::Interpret { command, file } => run_interpret(command, file.as_deref()),
        WireCommand::Repl => run_repl(),
    }
}

/// ログ出力を初期化する
///
/// 標準出力は解析結果に使うため、ログは標準エラー出力に書きます。
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// 入力元を開く（パスがなければ標準入力）
fn open_input(file: Option<&Path>) -> Result<Box<dyn Read>> {
    match file {
        Some(path) => {
            let f = File::open(path)
                .with_context(|| format!("Failed to open {}", path.display()))?;
            Ok(Box::new(f))
        }
        None => Ok(Box::new(io::stdin().lock())),
    }
}

/// 溜まったイベントを表示して捨てる
fn print_events(wire: &mut Wire<Vec<WireEvent>>) {
    for event in wire.handler_mut().drain(..) {
        println!("{}", event);
    }
}

/// MI出力をチャンクごとに読み込んで表示する
fn run_parse(file: Option<&Path>, chunk_size: usize) -> Result<()> {
    let mut input = open_input(file)?;
    let mut wire = Wire::new(Vec::new());
    let mut buf = vec![0u8; chunk_size];
    let mut total = 0usize;

    loop {
        let n = match input.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e).context("Failed to read input"),
        };
        total += n;
        debug!("pushing {} bytes", n);
        wire.push(&buf[..n]).context("Failed to decode input")?;
        print_events(&mut wire);
    }

    wire.flush().context("Failed to decode input")?;
    print_events(&mut wire);
    info!("decoded {} bytes", total);
    Ok(())
}

/// 1つのコマンドの出力を解釈して表示する
fn run_interpret(kind: CommandKind, file: Option<&Path>) -> Result<()> {
    let mut bytes = Vec::new();
    open_input(file)?
        .read_to_end(&mut bytes)
        .context("Failed to read input")?;
    let text = String::from_utf8_lossy(&bytes);

    let command = interpret(&text, kind)
        .with_context(|| format!("Failed to interpret output of {}", kind))?;
    print_command(&command);
    Ok(())
}

/// ブレークポイントを1行で表示する
fn print_breakpoint(bp: &Breakpoint, indent: &str) {
    let mut line = format!("{}{}", indent, bp.number);
    if let Some(kind) = &bp.kind {
        line.push_str(&format!(" {}", kind));
    }
    line.push_str(&format!(
        " disp={} enabled={}",
        bp.disposition.as_str(),
        if bp.enabled { "y" } else { "n" }
    ));
    if bp.pending {
        line.push_str(" <PENDING>");
    } else if bp.multi {
        line.push_str(" <MULTIPLE>");
    } else if let Some(addr) = bp.address.as_ref().and_then(|a| a.value()) {
        line.push_str(&format!(" @ 0x{:x}", addr));
    }
    if let Some(func) = &bp.func_name {
        line.push_str(&format!(" in {}", func));
    }
    if let Some(file) = &bp.file {
        line.push_str(&format!(" at {}:{}", file, bp.line));
    }
    if let Some(catch_type) = &bp.catch_type {
        line.push_str(&format!(" catch {}", catch_type));
    }
    if bp.times > 0 {
        line.push_str(&format!(" (hit {} times)", bp.times));
    }
    println!("{}", line);

    for child in &bp.multi_breakpoints {
        print_breakpoint(child, &format!("{}  ", indent));
    }
}

/// 解釈したコマンド結果を表示する
fn print_command(command: &MiCommand) {
    match command {
        MiCommand::BreakInfo { breakpoints } => {
            if breakpoints.is_empty() {
                println!("No breakpoints");
            }
            for bp in breakpoints {
                print_breakpoint(bp, "");
            }
        }
        MiCommand::StackInfoFrame { frame } => {
            let mut line = format!("#{}", frame.level);
            match frame.pc() {
                Some(pc) => line.push_str(&format!(" 0x{:016x}", pc)),
                None => line.push_str(" <unavailable>"),
            }
            line.push_str(&format!(" in {}", frame.func.as_deref().unwrap_or("??")));
            if let Some(file) = &frame.file {
                line.push_str(&format!(" at {}:{}", file, frame.line));
            } else if let Some(from) = &frame.from {
                line.push_str(&format!(" from {}", from));
            }
            println!("{}", line);
        }
        MiCommand::FileListExecSourceFile(current) => {
            println!(
                "{}:{}",
                current.source.fullname.as_deref().unwrap_or(&current.source.file),
                current.line
            );
            if let Some(macro_info) = current.macro_info {
                println!("macro info: {}", if macro_info { "yes" } else { "no" });
            }
        }
        MiCommand::FileListExecSourceFiles { files } => {
            for file in files {
                match &file.fullname {
                    Some(fullname) => println!("{} ({})", file.file, fullname),
                    None => println!("{}", file.file),
                }
            }
        }
    }
}

/// REPLループを実行する
fn run_repl() -> Result<()> {
    println!("Mikan - GDB/MI output decoder");
    println!("Type MI output lines, 'help' for help, 'quit' to exit.");
    println!();

    let mut rl = DefaultEditor::new()?;
    let mut wire = Wire::new(Vec::new());

    loop {
        let readline = rl.readline("(mikan) ");
        match readline {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                rl.add_history_entry(line.as_str())?;

                match line.trim() {
                    "quit" | "q" | "exit" => break,
                    "help" | "h" | "?" => {
                        print_help();
                        continue;
                    }
                    _ => {}
                }

                if let Err(e) = wire.push_str(&format!("{}\n", line)) {
                    eprintln!("Error: {}", e);
                }
                print_events(&mut wire);
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => {
                eprintln!("Error: {:?}", err);
                break;
            }
        }
    }

    Ok(())
}

/// ヘルプを表示する
fn print_help() {
    println!("Each line is decoded as one line of GDB/MI output, for example:");
    println!("  ^done,value=\"42\"");
    println!("  *stopped,reason=\"breakpoint-hit\",bkptno=\"1\"");
    println!("  ~\"Hello\\n\"");
    println!("  (gdb)");
    println!();
    println!("  help, h, ?    - Show this help");
    println!("  quit, q, exit - Exit");
}
