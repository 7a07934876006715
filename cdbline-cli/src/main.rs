//! cdbline CLI - コマンドラインインターフェース
//!
//! CDBドライバをデバッガプロセスなしで動かすためのツール。
//! 起動コマンドラインの表示、記録したCDB出力の再生、対話セッションを提供します。

mod command;
mod console;

use anyhow::{Context, Result};
use cdbline_core::{Breakpoint, Driver, DriverConfig, Framing, TipRect};
use clap::{Parser, Subcommand};
use command::{Location, ReplCommand};
use console::{ConsoleFrontEnd, ConsoleTransport};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

type ConsoleDriver = Driver<ConsoleTransport, ConsoleFrontEnd>;

/// cdbline - CDB command/response driver
#[derive(Parser)]
#[command(name = "cdbline")]
#[command(version = "0.1.0")]
#[command(about = "Command/response driver for the CDB console debugger", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Print the command line used to launch CDB
    Cmdline {
        /// Path to the debugger executable
        debugger: String,

        /// Program to debug
        #[arg(required_unless_present = "pid")]
        debuggee: Option<String>,

        /// Attach to a running process instead of launching one
        #[arg(short, long, conflicts_with = "debuggee")]
        pid: Option<u32>,

        /// Symbol and source search directory (repeatable)
        #[arg(short = 'd', long = "dir")]
        dirs: Vec<String>,

        /// Working directory to switch to before launching
        #[arg(short, long)]
        working_dir: Option<PathBuf>,

        /// Macro definition KEY=VALUE (repeatable)
        #[arg(short = 'D', long = "define", value_parser = parse_define)]
        defines: Vec<(String, String)>,

        /// Resolve unknown macros from environment variables
        #[arg(long)]
        env: bool,
    },

    /// Replay a recorded CDB transcript through the driver
    Replay {
        /// Transcript file (one output line per line)
        transcript: PathBuf,

        /// Known breakpoint NUMBER:FILE:LINE (repeatable)
        #[arg(short, long = "breakpoint", value_parser = parse_breakpoint)]
        breakpoints: Vec<Breakpoint>,

        /// Do not send 'g' after the start-up commands
        #[arg(long)]
        do_not_run: bool,

        /// Feed the transcript as one raw chunk instead of line by line
        #[arg(long)]
        raw: bool,
    },

    /// Interactive session; paste CDB output with a leading '<'
    Repl {
        /// Known breakpoint NUMBER:FILE:LINE (repeatable)
        #[arg(short, long = "breakpoint", value_parser = parse_breakpoint)]
        breakpoints: Vec<Breakpoint>,

        /// Do not send 'g' after the start-up commands
        #[arg(long)]
        do_not_run: bool,
    },
}

fn parse_define(s: &str) -> std::result::Result<(String, String), String> {
    s.split_once('=')
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", s))
}

fn parse_breakpoint(s: &str) -> std::result::Result<Breakpoint, String> {
    let (number, location) = s
        .split_once(':')
        .ok_or_else(|| format!("expected NUMBER:FILE:LINE, got '{}'", s))?;
    let number: u32 = number
        .parse()
        .map_err(|e| format!("invalid breakpoint number '{}': {}", number, e))?;
    match Location::parse(location) {
        Location::Line(file, line) => Ok(Breakpoint::at_line(number, file, line - 1)),
        Location::Function(_) => Err(format!("expected FILE:LINE after the number, got '{}'", location)),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        CliCommand::Cmdline {
            debugger,
            debuggee,
            pid,
            dirs,
            working_dir,
            defines,
            env,
        } => {
            let config = DriverConfig {
                directories: dirs,
                working_dir,
                ..DriverConfig::default()
            };
            let mut driver = new_driver(config, Vec::new())?;
            driver.macros_mut().set_env_vars_too(env);
            for (key, value) in &defines {
                driver.macros_mut().set(key, value.as_str());
            }

            let cmd = match (pid, debuggee) {
                (Some(pid), _) => driver.get_command_line_for_pid(&debugger, pid)?,
                (None, Some(debuggee)) => driver.get_command_line(&debugger, &debuggee)?,
                (None, None) => anyhow::bail!("either a debuggee or --pid is required"),
            };
            println!("{}", cmd);
        }

        CliCommand::Replay {
            transcript,
            breakpoints,
            do_not_run,
            raw,
        } => {
            let config = DriverConfig {
                do_not_run,
                framing: if raw { Framing::Raw } else { Framing::Lines },
                ..DriverConfig::default()
            };
            let mut driver = new_driver(config, breakpoints)?;
            replay(&mut driver, &transcript)?;
        }

        CliCommand::Repl {
            breakpoints,
            do_not_run,
        } => {
            let config = DriverConfig {
                do_not_run,
                ..DriverConfig::default()
            };
            let mut driver = new_driver(config, breakpoints)?;
            run_repl(&mut driver)?;
        }
    }

    Ok(())
}

fn new_driver(config: DriverConfig, breakpoints: Vec<Breakpoint>) -> Result<ConsoleDriver> {
    Driver::new(
        ConsoleTransport::default(),
        ConsoleFrontEnd::new(breakpoints),
        config,
    )
}

/// 記録されたCDB出力を流し込む
fn replay(driver: &mut ConsoleDriver, transcript: &Path) -> Result<()> {
    let text = std::fs::read_to_string(transcript)
        .with_context(|| format!("failed to read transcript {}", transcript.display()))?;
    info!("Replaying {} ({} lines)", transcript.display(), text.lines().count());

    driver.start()?;

    match driver.config().framing {
        Framing::Raw => driver.feed(&text)?,
        Framing::Lines => {
            for line in text.lines() {
                driver.feed(line)?;
            }
        }
    }

    println!();
    println!("Commands sent: {}", driver.transport().sent);
    println!("Debuggee state: {:?}", driver.state());
    if !driver.queue().is_empty() {
        println!("Still queued: {}", driver.queue().len());
    }
    if !driver.pending_output().is_empty() {
        println!("Unterminated output:");
        for line in driver.pending_output().lines() {
            println!("  {}", line);
        }
    }
    Ok(())
}

/// REPLループを実行する
fn run_repl(driver: &mut ConsoleDriver) -> Result<()> {
    println!("cdbline - CDB command/response driver");
    println!("Type 'help' for available commands, 'quit' to exit.");
    println!();

    let mut rl = DefaultEditor::new()?;

    loop {
        let readline = rl.readline("(cdbline) ");
        match readline {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }

                rl.add_history_entry(line.as_str())?;

                match ReplCommand::parse(&line) {
                    Some(ReplCommand::Quit) => break,
                    Some(cmd) => {
                        if let Err(e) = handle_command(driver, cmd) {
                            eprintln!("Error: {}", e);
                        }
                    }
                    None => {
                        println!("Unknown command: {}", line.trim());
                        println!("Type 'help' for available commands.");
                    }
                }
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

fn handle_command(driver: &mut ConsoleDriver, cmd: ReplCommand) -> Result<()> {
    match cmd {
        ReplCommand::Start => driver.start()?,
        ReplCommand::Continue => driver.continue_execution()?,
        ReplCommand::Step => driver.step()?,
        ReplCommand::StepIn => driver.step_in()?,
        ReplCommand::StepOut => driver.step_out()?,
        ReplCommand::Backtrace => driver.backtrace()?,
        ReplCommand::Frame(number) => driver.switch_to_frame(number)?,
        ReplCommand::Break(loc) => handle_break(driver, &loc)?,
        ReplCommand::Delete(number) => handle_delete(driver, number)?,
        ReplCommand::Watch(expression) => {
            driver.frontend_mut().watches.push(expression.clone());
            driver.update_watch(&expression)?;
        }
        ReplCommand::Watches => {
            let watches = driver.frontend().watches.clone();
            driver.update_watches(true, &watches)?;
        }
        ReplCommand::Print(expression) => driver.evaluate_symbol(&expression, TipRect::default())?,
        ReplCommand::Registers => driver.cpu_registers()?,
        ReplCommand::Disassemble => driver.disassemble()?,
        ReplCommand::Detach => driver.detach()?,
        ReplCommand::Stop => driver.stop()?,
        ReplCommand::Feed(output) => driver.feed(&output)?,
        ReplCommand::Queue => print_queue(driver),
        ReplCommand::Help => print_help(),
        ReplCommand::Quit => {}
    }
    Ok(())
}

/// Breakコマンドを処理する
fn handle_break(driver: &mut ConsoleDriver, loc: &str) -> Result<()> {
    let number = driver.frontend().next_breakpoint_number();
    let bp = match Location::parse(loc) {
        // ユーザー入力は1始まり、保持するのは0始まり
        Location::Line(file, line) => Breakpoint::at_line(number, file, line - 1),
        Location::Function(function) => Breakpoint::at_function(number, function),
    };
    driver.frontend_mut().breakpoints.push(bp.clone());
    driver.add_breakpoint(&bp)
}

/// Deleteコマンドを処理する
fn handle_delete(driver: &mut ConsoleDriver, number: u32) -> Result<()> {
    let breakpoints = &mut driver.frontend_mut().breakpoints;
    let Some(idx) = breakpoints.iter().position(|bp| bp.number == number) else {
        println!("No breakpoint number {}", number);
        return Ok(());
    };
    let bp = breakpoints.remove(idx);
    driver.remove_breakpoint(&bp)
}

fn print_queue(driver: &ConsoleDriver) {
    if driver.queue().is_empty() {
        println!("Queue is empty");
        return;
    }
    for (i, cmd) in driver.queue().iter().enumerate() {
        let marker = if i == 0 && driver.queue().is_busy() { "*" } else { " " };
        let text = if cmd.is_placeholder_only() { "(update watches)" } else { cmd.text() };
        println!("  {} #{} {}", marker, cmd.issued_at(), text);
    }
}

fn print_help() {
    println!("Available commands:");
    println!();
    println!("  help              - Show this help message");
    println!("  quit/exit/q       - Exit");
    println!();
    println!("Debug commands:");
    println!("  start             - Send the start-up commands");
    println!("  continue (c)      - Continue execution");
    println!("  next (n)          - Step over");
    println!("  step (s)          - Step into");
    println!("  finish (f)        - Step out of the current function");
    println!("  bt                - Show backtrace");
    println!("  frame <n>         - Switch to frame n");
    println!("  break <loc>       - Set breakpoint at FILE:LINE or function");
    println!("  delete <n>        - Remove breakpoint n");
    println!("  watch <expr>      - Add and evaluate a watch");
    println!("  watches           - Re-evaluate locals and all watches");
    println!("  print <expr>      - Evaluate an expression once");
    println!("  regs              - Show CPU registers");
    println!("  disas             - Disassemble the current function");
    println!("  detach            - Detach from the debuggee");
    println!("  stop              - Quit the debugger");
    println!("  queue             - Show queued commands");
    println!();
    println!("Debugger output:");
    println!("  < <text>          - Feed one line of CDB output (e.g. '< 0:000> ')");
    println!();
    println!("Examples:");
    println!("  break main.cpp:42");
    println!("  < Breakpoint 0 hit");
    println!("  < 0:000> ");
}
