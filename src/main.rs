use std::env;
use std::fs;
use std::process;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ruscript::{natives, Interpreter};

const DEMO: &str = r#"
function fib(n) {
    if (n < 2) return n;
    return fib(n - 1) + fib(n - 2);
}

var out = "";
for (var i = 0; i < 10; i++) {
    if (i > 0) out += ", ";
    out += fib(i);
}
print("fib: " + out);
"#;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let mut js = Interpreter::new();
    natives::register_functions(&mut js)?;
    js.add_native("function print(text)", |_js, frame| {
        println!(
            "{}",
            frame.borrow_mut().get_parameter("text").borrow().get_string()
        );
        Ok(())
    })?;

    let code = match env::args().nth(1) {
        Some(path) => fs::read_to_string(path)?,
        None => DEMO.to_string(),
    };

    if let Err(e) = js.execute(&code) {
        eprintln!("{e}");
        process::exit(1);
    }

    Ok(())
}
