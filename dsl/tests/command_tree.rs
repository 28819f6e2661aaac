use std::collections::BTreeMap;
use std::io;
use std::sync::{Arc, Mutex};

use optspec_core::{Arity, CastKind, ConfigurationError, Flow, OptionConfig, Value};
use optspec_dsl::{
    Command, CommandSummary, ExecResult, HELP, HelpRenderer, Invocation, Loaded, PrinterKind,
    PrinterOptions, SuperCommand, VERSION,
};

fn no_color() -> PrinterOptions {
    PrinterOptions {
        template: None,
        color: Some(false),
    }
}

fn git() -> SuperCommand {
    SuperCommand::build("git", |b| {
        b.printer(PrinterKind::Standard, Some(&no_color()))?;
        b.summary("The stupid content tracker");
        b.boolean("verbose", "Be verbose")?;
        b.help(None)?;
        b.version("2.43.0")?;
        b.command("commit", |c| {
            c.summary("Record changes to the repository");
            c.string("message", "Use the given message")?;
            c.option("amend", |o| {
                o.long("--amend").negate("no").desc("Amend the previous commit");
                Ok(())
            })?;
            c.arguments(|tokens| Ok(Flow::Continue(Value::Integer(tokens.len() as i64))));
            Ok(())
        })?;
        b.help_command(None)?;
        Ok(())
    })
    .unwrap()
}

#[test]
fn tree_shape() {
    let git = git();

    assert_eq!(
        git.subcommands().map(|c| c.name()).collect::<Vec<_>>(),
        vec!["commit", "help"]
    );
    assert_eq!(git.option(HELP).unwrap().short_flag(), Some("-h"));
    assert_eq!(git.option(VERSION).unwrap().long_flag(), Some("--version"));

    let commit = git.subcommand("commit").unwrap();
    let message = commit.option("message").unwrap();
    assert_eq!(message.short_flag(), Some("-m"));
    assert_eq!(message.arity(), Arity::One);
    assert_eq!(message.cast(), Some(CastKind::String));

    let amend = commit.find_flag("--no-amend").unwrap();
    assert_eq!(amend.name(), "amend");
    assert_eq!(amend.default_value(), Some(&Value::Bool(false)));
}

#[test]
fn help_and_version_flow() {
    let git = git();

    let help = git.find_flag("--help").unwrap();
    assert_eq!(
        help.argument().validate(&["commit".to_string()]).unwrap(),
        Flow::Help(Some("commit".to_string()))
    );

    let version = git.find_flag("--version").unwrap();
    assert_eq!(
        version.argument().validate(&[]).unwrap(),
        Flow::Version("2.43.0".to_string())
    );

    let help_command = git.subcommand("help").unwrap();
    assert_eq!(
        help_command.arguments().unwrap().validate(&[]).unwrap(),
        Flow::Help(None)
    );
}

#[test]
fn rendered_help() {
    let mut out = Vec::new();
    git().print_help(&mut out).unwrap();
    let text = String::from_utf8(out).unwrap();

    assert!(text.starts_with("Usage: git [OPTIONS] COMMAND\n"));
    assert!(text.contains("The stupid content tracker"));
    assert!(text.contains("-h, --help"));
    assert!(text.contains("Show this help message"));
    assert!(text.contains("commit"));
    assert!(text.contains("Record changes to the repository"));
}

#[test]
fn executor_receives_invocation() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);

    let command = Command::build("echo", |b| {
        b.strings("word", "Words to echo")?;
        b.executor(move |invocation: &Invocation| -> ExecResult {
            sink.lock().unwrap().extend(invocation.arguments.iter().cloned());
            Ok(())
        });
        Ok(())
    })
    .unwrap();

    let invocation = Invocation {
        options: BTreeMap::new(),
        arguments: vec!["a".to_string(), "b".to_string()],
    };
    command.execute(&invocation).unwrap();
    assert_eq!(*seen.lock().unwrap(), vec!["a", "b"]);
}

#[test]
fn execute_without_executor_fails() {
    let command = Command::build("idle", |_| Ok(())).unwrap();
    assert!(command.execute(&Invocation::default()).is_err());
}

struct Fixed;

impl HelpRenderer for Fixed {
    fn print_help(
        &self,
        command: &Command,
        _metaname: Option<&str>,
        out: &mut dyn io::Write,
    ) -> io::Result<()> {
        writeln!(out, "fixed help for {}", command.name())
    }
}

#[test]
fn custom_printer() {
    let command = Command::build("tool", |b| {
        b.printer(PrinterKind::Custom(Box::new(Fixed)), Some(&no_color()))?;
        Ok(())
    })
    .unwrap();

    let mut out = Vec::new();
    command.print_help(&mut out).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "fixed help for tool\n");
}

#[test]
fn config_and_block_order() {
    let config = OptionConfig::new().default_value(Value::Integer(3)).short("-n");

    let command = Command::build("tool", |b| {
        b.declare(
            CastKind::Integer,
            optspec_dsl::Shape::ONE,
            "count",
            "How many",
            Some(&config),
            |o| {
                o.default_value(7i64);
                Ok(())
            },
        )?;
        Ok(())
    })
    .unwrap();

    let count = command.option("count").unwrap();
    assert_eq!(count.short_flag(), Some("-n"));
    assert_eq!(count.default_value(), Some(&Value::Integer(7)));
}

#[test]
fn dependency_must_be_declared() {
    let err = Command::build("tool", |b| {
        b.option("output", |o| {
            o.long("--output").param(Some("FILE")).dependencies(["format"]);
            Ok(())
        })?;
        Ok(())
    })
    .unwrap_err();
    assert!(matches!(err, ConfigurationError::UnknownDependency { .. }));
}

#[test]
fn loaded_file_matches_built_tree() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("git.yml");
    std::fs::write(
        &path,
        r#"
name: git
summary: The stupid content tracker
printer: { kind: standard, color: false }
help: true
version: "2.43.0"
help_command: true
options:
  - boolean: [verbose, "Be verbose"]
commands:
  - name: commit
    summary: Record changes to the repository
    options:
      - string: [message, "Use the given message"]
      - amend: { long: --amend, negation: no, desc: "Amend the previous commit" }
"#,
    )
    .unwrap();

    let Loaded::Super(loaded) = optspec_dsl::load(&path).unwrap() else {
        panic!("expected a super-command");
    };
    let built = git();

    let loaded = serde_json::to_value(CommandSummary::from(&loaded)).unwrap();
    let built = serde_json::to_value(CommandSummary::from(&built)).unwrap();
    assert_eq!(loaded["options"], built["options"]);
    assert_eq!(
        loaded["commands"][0]["options"],
        built["commands"][0]["options"]
    );
    assert_eq!(loaded["commands"][1]["name"], "help");
}
