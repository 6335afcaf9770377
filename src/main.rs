use ansi_term::Colour::Red;
use ansi_term::Style;
use clap::{Arg, Command};
use rustyline::error::ReadlineError;
use rustyline::Editor;
use std::fs;
use std::process::exit;

use ry::{
  compile, parse, print, tokenize, Chunk, Diagnostic, RuntimeError, StdModules, Value, VM,
};

fn read_file(filename: &str) -> String {
  match fs::read_to_string(filename) {
    Ok(file) => file,
    Err(_) => {
      eprintln!("{} Problem reading file: {}", Red.bold().paint("Error:"), filename);
      exit(74);
    }
  }
}

fn code_frame(file: &str, source: &str, line_number: usize) {
  eprintln!("    ╭─[{}]", file);
  if line_number > 2 {
    eprintln!("    ·");
  } else {
    eprintln!("    │");
  }

  let start = line_number.saturating_sub(3);
  for (i, line) in source.lines().enumerate().take(line_number).skip(start) {
    eprintln!("{:>3} │ {}", i + 1, line);
  }
  if line_number < source.lines().count() {
    eprintln!("    ·");
  }
  eprintln!("────╯");
}

fn print_compile_error(file: &str, source: &str, error: &Diagnostic) {
  eprintln!(
    "{} {}",
    Red.bold().paint("Compile Error:"),
    Style::new().bold().paint(error.to_string())
  );
  if !error.message.is_empty() {
    eprintln!("{}", error.message);
  }
  code_frame(file, source, error.line as usize);
}

fn print_runtime_error(file: &str, source: &str, error: &RuntimeError) {
  eprintln!(
    "{} {}",
    Red.bold().paint("Runtime panic:"),
    Style::new().bold().paint(&error.message)
  );
  for (function, line) in &error.traceback {
    eprintln!("  at {}:{}", function, line);
  }
  code_frame(file, source, error.line as usize);
}

fn build(filename: &str, source: &str) -> Result<Chunk, ()> {
  let tokens = tokenize(source);

  let ast = match parse(&tokens) {
    Ok(ast) => ast,
    Err(error) => {
      print_compile_error(filename, source, &error);
      return Err(());
    }
  };

  match compile(&ast) {
    Ok(chunk) => Ok(chunk),
    Err(errors) => {
      for error in &errors {
        print_compile_error(filename, source, error);
      }
      Err(())
    }
  }
}

fn run_file(filename: &str, source: &str) {
  let chunk = match build(filename, source) {
    Ok(chunk) => chunk,
    Err(()) => exit(65),
  };

  if let Err(error) = ry::run(chunk) {
    print_runtime_error(filename, source, &error);
    exit(70);
  }
}

fn repl() {
  let mut rl = Editor::<()>::new();
  let modules = StdModules::new();
  let mut vm = VM::new(&modules);

  loop {
    let readline = rl.readline("> ");
    match readline {
      Ok(line) => {
        rl.add_history_entry(&line);

        if let Ok(chunk) = build("REPL", &line) {
          match vm.run(chunk) {
            Ok(Value::Nil) => {}
            Ok(value) => println!("{}", value),
            Err(error) => print_runtime_error("REPL", &line, &error),
          }
        }
      }
      Err(ReadlineError::Interrupted | ReadlineError::Eof) => {
        break;
      }
      Err(error) => {
        println!("Error: {:?}", error);
        break;
      }
    }
  }
}

fn main() {
  let version = "v0.1.0";
  let app = Command::new("ry")
    .version(version)
    .subcommand(
      Command::new("run")
        .about("Execute a Ry program")
        .arg(Arg::new("file").help("The file to run").required(true)),
    )
    .subcommand(
      Command::new("tokens")
        .about("Display the tokens for a file")
        .arg(Arg::new("file").help("The file to scan").required(true)),
    )
    .subcommand(
      Command::new("ast")
        .about("Display the abstract syntax tree for a file")
        .arg(Arg::new("file").help("The file to parse").required(true)),
    )
    .subcommand(
      Command::new("bytecode")
        .about("Display the bytecode from a file")
        .arg(Arg::new("file").help("The file to compile").required(true)),
    )
    .get_matches();

  if let Some((command @ ("run" | "tokens" | "ast" | "bytecode"), subcommand)) = app.subcommand() {
    let filename = subcommand.value_of("file").unwrap();
    let source = read_file(filename);

    match command {
      "run" => run_file(filename, &source),
      "tokens" => print::tokens(&tokenize(&source)),
      "ast" => match parse(&tokenize(&source)) {
        Ok(ast) => println!("{:#?}", ast),
        Err(error) => {
          print_compile_error(filename, &source, &error);
          exit(65);
        }
      },
      "bytecode" => {
        if let Ok(chunk) = build(filename, &source) {
          print::chunk(&chunk, "(script)");
        } else {
          exit(65);
        }
      }
      _ => unreachable!(),
    }
  } else {
    println!("Ry ({})", version);
    repl();
  }
}
