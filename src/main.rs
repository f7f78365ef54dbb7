use std::rc::Rc;

use clap::Parser as ClapParser;
use smy_vm::{Runtime, RuntimeError, Value};

mod json;

fn main() {
    let opt = Opt::parse();
    init_tracing(opt.log.as_deref());

    if let Err(err) = run(opt) {
        eprintln!("{}", err);
        std::process::exit(1);
    }
}

fn run(opt: Opt) -> Result<(), CliError> {
    let rt = Runtime::new();

    let name = match opt.builtin {
        Some(name) if !opt.list => name,
        _ => {
            for name in rt.builtin_names() {
                println!("{}", name);
            }
            return Ok(());
        }
    };

    for line in invoke(&rt, &name, &opt.args)? {
        println!("{}", line);
    }
    Ok(())
}

/// Call builtin `name` with JSON `args` and return the lines to print: the
/// result unless it is None and, for `delitem`, the container afterwards.
fn invoke(rt: &Rc<Runtime>, name: &str, args: &[String]) -> Result<Vec<String>, CliError> {
    let callee = rt
        .builtin(name)
        .ok_or_else(|| CliError::UnknownBuiltin(name.to_owned()))?;
    let deletes = name == "delitem";

    let args = args
        .iter()
        .enumerate()
        .map(|(index, src)| -> Result<Value, CliError> {
            let doc = serde_json::from_str(src)
                .map_err(|source| CliError::BadArgument { index, source })?;
            let host = if deletes && index == 1 {
                json::to_index(doc)
            } else {
                json::to_host(doc)
            };
            Ok(rt.value_from_host(host)?)
        })
        .collect::<Result<Vec<_>, CliError>>()?;
    let container = if deletes { args.first().cloned() } else { None };

    tracing::debug!(builtin = %name, argc = args.len(), "invoke");
    let result = callee.call(&rt.top_frame(), args)?;

    let mut lines = vec![];
    if !result.is_none() {
        lines.push(result.repr());
    }
    if let Some(container) = container {
        lines.push(container.repr());
    }
    Ok(lines)
}

fn init_tracing(filter: Option<&str>) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = match filter {
        Some(filter) => EnvFilter::new(filter),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("no builtin named '{0}'; run with --list to see them all")]
    UnknownBuiltin(String),

    #[error("argument {index} is not valid JSON: {source}")]
    BadArgument {
        index: usize,
        source: serde_json::Error,
    },

    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

#[derive(clap::Parser)]
#[clap(about, version, author)]
struct Opt {
    /// Log filter, in `RUST_LOG` syntax. Defaults to `RUST_LOG`, then `warn`.
    #[clap(long)]
    log: Option<String>,

    /// List the registered builtins and exit.
    #[clap(long)]
    list: bool,

    /// The builtin to call. Without one, the builtins are listed.
    builtin: Option<String>,

    /// Arguments to the builtin, each a JSON document.
    args: Vec<String>,
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use smy_vm::Runtime;

    use super::{invoke, CliError};

    fn lines(name: &str, args: &[&str]) -> Result<Vec<String>, CliError> {
        let args = args.iter().map(|a| a.to_string()).collect::<Vec<_>>();
        invoke(&Runtime::new(), name, &args)
    }

    #[test]
    fn test_delitem_slice() {
        let out = lines("delitem", &["[10, 20, 30, 40]", "[1, 3, null]"]).unwrap();
        assert_eq!(out, ["[10, 40]"]);
        let out = lines("delitem", &["[10, 20, 30, 40]", "[-3, null, null]"]).unwrap();
        assert_eq!(out, ["[10]"]);
    }

    #[test]
    fn test_delitem_position_and_key() {
        let out = lines("delitem", &["[10, 20, 30, 40]", "1"]).unwrap();
        assert_eq!(out, ["20", "[10, 30, 40]"]);
        let out = lines("delitem", &[r#"{"a": 1, "b": 2}"#, r#""a""#]).unwrap();
        assert_eq!(out, ["1", "{'b': 2}"]);
    }

    #[test]
    fn test_delitem_errors() {
        let err = lines("delitem", &["[1]", r#""x""#]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "TypeError: list indices must be integers or slices, not str"
        );
        let err = lines("delitem", &["[1, 2]", "[1, 2]"]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "TypeError: list indices must be integers or slices, not list"
        );
        let err = lines("delitem", &["[1]", "[0"]).unwrap_err();
        assert!(matches!(err, CliError::BadArgument { index: 1, .. }));
    }

    #[test]
    fn test_other_builtins() {
        assert_eq!(lines("len", &["[1, 2, 3]"]).unwrap(), ["3"]);
        assert_eq!(lines("list", &["[1, 2, 3]"]).unwrap(), ["[1, 2, 3]"]);
        assert!(lines("print", &["1"]).unwrap().is_empty());
        let err = lines("nope", &[]).unwrap_err();
        assert!(matches!(err, CliError::UnknownBuiltin(name) if name == "nope"));
    }
}
