use std::fs::File;
use std::io::{self, BufReader};
use std::process::ExitCode;

use clap::Parser;
use teeny_class_file::ClassFile;

const MAIN_DESCRIPTOR: &str = "([Ljava/lang/String;)V";

/// Runs a single `.class` file's `main` method.
#[derive(Parser, Debug)]
#[command(name = "teeny-jvm", version, about)]
struct Args {
    /// Path to the `.class` file to run.
    classfile: String,
}

fn run(args: Args) -> Result<(), String> {
    let file = File::open(&args.classfile)
        .map_err(|e| format!("cannot open {}: {}", args.classfile, e))?;
    let mut reader = BufReader::new(file);

    let class = ClassFile::parse(&mut reader).map_err(|e| format!("{}", e))?;
    log::info!("loaded class file, version {:?}", class.version);

    let main = class
        .find_method("main", MAIN_DESCRIPTOR)
        .map_err(|_| "no main([Ljava/lang/String;)V method found".to_string())?;
    let code = main
        .code
        .as_ref()
        .ok_or_else(|| "main has no Code attribute".to_string())?;

    let locals = vec![0i32; code.max_locals as usize];
    let mut heap = teeny_vm::Heap::new();
    let stdout = io::stdout();
    let mut lock = stdout.lock();

    match teeny_vm::execute(main, locals, &class, &mut heap, &mut lock) {
        Ok(None) => Ok(()),
        Ok(Some(_)) => Err(format!("{}", teeny_vm::JvmError::MainMustReturnVoid)),
        Err(e) => Err(format!("{}", e)),
    }
}

fn main() -> ExitCode {
    env_logger::init();

    let program = std::env::args().next().unwrap_or_else(|| "teeny-jvm".to_string());
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if e.use_stderr() => {
            eprintln!("USAGE: {} <class file>", program);
            return ExitCode::FAILURE;
        }
        Err(e) => e.exit(),
    };

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("teeny-jvm: {}", message);
            ExitCode::FAILURE
        }
    }
}
