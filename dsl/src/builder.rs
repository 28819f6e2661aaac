//! The command builder DSL.
//!
//! Options are declared through a matrix of methods generated from the
//! cast-kind registry. Every kind except boolean gets four shapes:
//!
//! | method       | short flag | arity |
//! |--------------|------------|-------|
//! | `integer`    | yes        | one   |
//! | `integers`   | yes        | many  |
//! | `integer_`   | no         | one   |
//! | `integers_`  | no         | many  |
//!
//! Booleans have their own pair, `boolean`/`boolean_` (aliased `bool` and
//! `bool_`). `single` and `multiple` are aliases for the one- and
//! many-valued string declarations. The same matrix is reachable by name
//! through [`CommandBuilder::declaration`].

use std::sync::Arc;

use serde_yaml::Value as Yaml;
use tracing::debug;

use optspec_core::{
    Argument, Arity, CastKind, ConfigurationError, Converter, Flow, OptionBuilder, OptionConfig,
    OptionSpec, StepResult,
};

use crate::command::{Command, Entry};
use crate::error::Result;
use crate::executor::Executable;
use crate::printer::{PrinterKind, PrinterOptions, StandardPrinter};

/// Name of the built-in help option.
pub const HELP: &str = "__help__";

/// Name of the built-in version option.
pub const VERSION: &str = "__version__";

/// Short-flag presence and arity of a generated declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape {
    pub short: bool,
    pub arity: Arity,
}

impl Shape {
    pub const FLAG: Shape = Shape::new(true, Arity::Zero);
    pub const LONG_FLAG: Shape = Shape::new(false, Arity::Zero);
    pub const ONE: Shape = Shape::new(true, Arity::One);
    pub const MANY: Shape = Shape::new(true, Arity::Many);
    pub const LONG_ONE: Shape = Shape::new(false, Arity::One);
    pub const LONG_MANY: Shape = Shape::new(false, Arity::Many);

    pub const fn new(short: bool, arity: Arity) -> Self {
        Self { short, arity }
    }
}

/// Fluent DSL over a [`Command`].
///
/// Each declaration finalizes its option immediately and registers it in
/// the command, so a broken declaration fails at the call that made it.
/// [`finalize`](CommandBuilder::finalize) checks what can only be checked
/// once everything is declared and hands back the command.
///
/// # Examples
///
/// ```
/// use optspec_core::{Arity, OptionConfig};
/// use optspec_dsl::CommandBuilder;
///
/// let mut b = CommandBuilder::new("serve").unwrap();
/// b.integer("port", "Port to listen on").unwrap();
/// b.strings_("allow_origin", "Allowed origins").unwrap();
/// b.help(None).unwrap();
///
/// let command = b.finalize().unwrap();
/// let origins = command.option("allow_origin").unwrap();
/// assert_eq!(origins.long_flag(), Some("--allow-origin"));
/// assert_eq!(origins.short_flag(), None);
/// assert_eq!(origins.arity(), Arity::Many);
/// assert!(command.find_flag("-h").is_some());
/// ```
#[derive(Debug)]
pub struct CommandBuilder {
    command: Command,
}

impl CommandBuilder {
    /// # Errors
    ///
    /// Returns [`ConfigurationError::EmptyName`] for a blank name.
    pub fn new(name: &str) -> Result<Self> {
        if name.trim().is_empty() {
            return Err(ConfigurationError::EmptyName);
        }
        Ok(Self {
            command: Command::new(name),
        })
    }

    /// The command as declared so far.
    pub fn command(&self) -> &Command {
        &self.command
    }

    pub(crate) fn command_mut(&mut self) -> &mut Command {
        &mut self.command
    }

    pub fn executor<E>(&mut self, executor: E) -> &mut Self
    where
        E: Executable + 'static,
    {
        self.command.set_executor(Arc::new(executor));
        self
    }

    pub fn summary(&mut self, summary: &str) -> &mut Self {
        self.command.set_summary(summary);
        self
    }

    pub fn desc(&mut self, description: &str) -> &mut Self {
        self.command.set_description(description);
        self
    }

    /// Sets the help printer.
    ///
    /// # Errors
    ///
    /// A template printer needs an existing template file in `options`.
    pub fn printer(
        &mut self,
        kind: PrinterKind,
        options: Option<&PrinterOptions>,
    ) -> Result<&mut Self> {
        let printer = kind.into_printer(options)?;
        self.command.set_printer(printer);
        Ok(self)
    }

    /// Appends a blank line (`None`) or literal text to the listing.
    pub fn separator(&mut self, text: Option<&str>) -> &mut Self {
        self.command
            .push(Entry::Separator(text.unwrap_or_default().to_string()));
        self
    }

    /// Declares an option by name, configured entirely by `block`.
    ///
    /// # Errors
    ///
    /// Returns any error from `block`, from the option's finalize pass, or
    /// a duplicate name or flag.
    pub fn option<F>(&mut self, name: &str, block: F) -> Result<Arc<OptionSpec>>
    where
        F: FnOnce(&mut OptionBuilder) -> Result<()>,
    {
        let mut builder = OptionBuilder::new(name);
        block(&mut builder)?;
        self.register(builder)
    }

    /// Declares an option from a single-entry mapping, see
    /// [`OptionBuilder::from_declaration`].
    pub fn option_from(&mut self, declaration: &Yaml) -> Result<Arc<OptionSpec>> {
        let builder = OptionBuilder::from_declaration(declaration)?;
        self.register(builder)
    }

    /// Resolves a declaration method name to its cast kind and shape.
    ///
    /// ```
    /// use optspec_core::{Arity, CastKind};
    /// use optspec_dsl::{CommandBuilder, Shape};
    ///
    /// assert_eq!(
    ///     CommandBuilder::declaration("integers_"),
    ///     Some((CastKind::Integer, Shape::new(false, Arity::Many)))
    /// );
    /// assert_eq!(CommandBuilder::declaration("bools"), None);
    /// ```
    pub fn declaration(method: &str) -> Option<(CastKind, Shape)> {
        let (base, short) = match method.strip_suffix('_') {
            Some(base) => (base, false),
            None => (method, true),
        };

        // Method names are case-sensitive even though cast tags are not.
        let kind_of = |tag: &str| {
            Converter::tags()
                .any(|known| known == tag)
                .then(|| CastKind::from_tag(tag))
                .flatten()
                .filter(|kind| !kind.is_boolean())
        };
        let (kind, arity) = match base {
            "boolean" | "bool" => (CastKind::Boolean, Arity::Zero),
            "single" => (CastKind::String, Arity::One),
            "multiple" => (CastKind::String, Arity::Many),
            _ => match kind_of(base) {
                Some(kind) => (kind, Arity::One),
                None => (base.strip_suffix('s').and_then(kind_of)?, Arity::Many),
            },
        };

        Some((kind, Shape::new(short, arity)))
    }

    /// Declares an option through the method named `method`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::UnknownDeclaration`] if `method` is not
    /// in the declaration table.
    pub fn declare_by_method(
        &mut self,
        method: &str,
        name: &str,
        desc: &str,
        config: Option<&OptionConfig>,
    ) -> Result<Arc<OptionSpec>> {
        let (cast, shape) = Self::declaration(method)
            .ok_or_else(|| ConfigurationError::UnknownDeclaration(method.to_string()))?;
        self.declare(cast, shape, name, desc, config, |_| Ok(()))
    }

    /// The generator behind every generated declaration method.
    ///
    /// Derives the long flag from `name` (lower-cased, `_` becomes `-`),
    /// the short flag from its first character when `shape.short` is set,
    /// and the parameter label from its upper-cased form. Then it applies
    /// `config`, runs `block` and registers the option.
    pub fn declare<F>(
        &mut self,
        cast: CastKind,
        shape: Shape,
        name: &str,
        desc: &str,
        config: Option<&OptionConfig>,
        block: F,
    ) -> Result<Arc<OptionSpec>>
    where
        F: FnOnce(&mut OptionBuilder) -> Result<()>,
    {
        let first = name.chars().next().ok_or(ConfigurationError::EmptyName)?;

        let mut builder = OptionBuilder::new(name);
        builder.desc(desc);
        if shape.short {
            builder.short(&format!("-{first}"));
        }
        builder.long(&format!("--{}", name.to_lowercase().replace('_', "-")));
        builder.param(param_label(name, shape.arity).as_deref());
        builder.cast(cast);
        if let Some(config) = config {
            builder.from_config(config);
        }

        block(&mut builder)?;
        self.register(builder)
    }

    pub fn boolean(&mut self, name: &str, desc: &str) -> Result<Arc<OptionSpec>> {
        self.boolean_with(name, desc, None, |_| Ok(()))
    }

    pub fn boolean_(&mut self, name: &str, desc: &str) -> Result<Arc<OptionSpec>> {
        self.boolean_with_(name, desc, None, |_| Ok(()))
    }

    /// Declares a boolean flag with a short flag, applying `config` and
    /// then `block`.
    ///
    /// ```
    /// use optspec_core::OptionConfig;
    /// use optspec_dsl::CommandBuilder;
    ///
    /// let mut b = CommandBuilder::new("rm").unwrap();
    /// let force = b
    ///     .boolean_with("force", "Ignore missing files", Some(&OptionConfig::new().negation("no")), |_| Ok(()))
    ///     .unwrap();
    /// assert_eq!(force.negated_flag(), Some("--no-force"));
    /// ```
    pub fn boolean_with<F>(
        &mut self,
        name: &str,
        desc: &str,
        config: Option<&OptionConfig>,
        block: F,
    ) -> Result<Arc<OptionSpec>>
    where
        F: FnOnce(&mut OptionBuilder) -> Result<()>,
    {
        self.declare(CastKind::Boolean, Shape::FLAG, name, desc, config, block)
    }

    pub fn boolean_with_<F>(
        &mut self,
        name: &str,
        desc: &str,
        config: Option<&OptionConfig>,
        block: F,
    ) -> Result<Arc<OptionSpec>>
    where
        F: FnOnce(&mut OptionBuilder) -> Result<()>,
    {
        self.declare(CastKind::Boolean, Shape::LONG_FLAG, name, desc, config, block)
    }

    pub fn bool(&mut self, name: &str, desc: &str) -> Result<Arc<OptionSpec>> {
        self.boolean(name, desc)
    }

    pub fn bool_(&mut self, name: &str, desc: &str) -> Result<Arc<OptionSpec>> {
        self.boolean_(name, desc)
    }

    pub fn bool_with<F>(
        &mut self,
        name: &str,
        desc: &str,
        config: Option<&OptionConfig>,
        block: F,
    ) -> Result<Arc<OptionSpec>>
    where
        F: FnOnce(&mut OptionBuilder) -> Result<()>,
    {
        self.boolean_with(name, desc, config, block)
    }

    pub fn bool_with_<F>(
        &mut self,
        name: &str,
        desc: &str,
        config: Option<&OptionConfig>,
        block: F,
    ) -> Result<Arc<OptionSpec>>
    where
        F: FnOnce(&mut OptionBuilder) -> Result<()>,
    {
        self.boolean_with_(name, desc, config, block)
    }

    pub fn single(&mut self, name: &str, desc: &str) -> Result<Arc<OptionSpec>> {
        self.string(name, desc)
    }

    pub fn single_(&mut self, name: &str, desc: &str) -> Result<Arc<OptionSpec>> {
        self.string_(name, desc)
    }

    pub fn single_with<F>(
        &mut self,
        name: &str,
        desc: &str,
        config: Option<&OptionConfig>,
        block: F,
    ) -> Result<Arc<OptionSpec>>
    where
        F: FnOnce(&mut OptionBuilder) -> Result<()>,
    {
        self.string_with(name, desc, config, block)
    }

    pub fn single_with_<F>(
        &mut self,
        name: &str,
        desc: &str,
        config: Option<&OptionConfig>,
        block: F,
    ) -> Result<Arc<OptionSpec>>
    where
        F: FnOnce(&mut OptionBuilder) -> Result<()>,
    {
        self.string_with_(name, desc, config, block)
    }

    pub fn multiple(&mut self, name: &str, desc: &str) -> Result<Arc<OptionSpec>> {
        self.strings(name, desc)
    }

    pub fn multiple_(&mut self, name: &str, desc: &str) -> Result<Arc<OptionSpec>> {
        self.strings_(name, desc)
    }

    pub fn multiple_with<F>(
        &mut self,
        name: &str,
        desc: &str,
        config: Option<&OptionConfig>,
        block: F,
    ) -> Result<Arc<OptionSpec>>
    where
        F: FnOnce(&mut OptionBuilder) -> Result<()>,
    {
        self.strings_with(name, desc, config, block)
    }

    pub fn multiple_with_<F>(
        &mut self,
        name: &str,
        desc: &str,
        config: Option<&OptionConfig>,
        block: F,
    ) -> Result<Arc<OptionSpec>>
    where
        F: FnOnce(&mut OptionBuilder) -> Result<()>,
    {
        self.strings_with_(name, desc, config, block)
    }

    /// Declares `-h`/`--help`.
    ///
    /// Its validation step asks for help, naming the first token (if any)
    /// as the subcommand help was requested for.
    pub fn help(&mut self, msg: Option<&str>) -> Result<Arc<OptionSpec>> {
        let mut builder = OptionBuilder::new(HELP);
        builder
            .short("-h")
            .long("--help")
            .desc(msg.unwrap_or("Show this help message"))
            .validate(|tokens| Ok(Flow::Help(tokens.first().cloned())));
        self.register(builder)
    }

    /// Declares `--version`, whose validation step asks for `msg` to be
    /// shown.
    pub fn version(&mut self, msg: &str) -> Result<Arc<OptionSpec>> {
        let msg = msg.to_string();
        let mut builder = OptionBuilder::new(VERSION);
        builder
            .long("--version")
            .desc("The version number")
            .validate(move |_| Ok(Flow::Version(msg.clone())));
        self.register(builder)
    }

    /// Attaches the validation step for positional arguments.
    pub fn arguments<F>(&mut self, step: F) -> &mut Self
    where
        F: Fn(&[String]) -> StepResult + Send + Sync + 'static,
    {
        let mut arguments = Argument::new();
        arguments.set_arity(Arity::Many);
        arguments.set_cast(CastKind::String);
        arguments.set_validation_step(Arc::new(step));
        self.command.set_arguments(arguments);
        self
    }

    /// Checks dependencies, defaults the printer and returns the command.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::UnknownDependency`] when an option
    /// depends on an option the command does not declare.
    pub fn finalize(mut self) -> Result<Command> {
        for option in self.command.options() {
            if let Some(dependency) = option
                .dependent_options()
                .iter()
                .find(|dep| !self.command.contains_option(dep))
            {
                return Err(ConfigurationError::UnknownDependency {
                    option: option.name().to_string(),
                    dependency: dependency.clone(),
                });
            }
        }

        if !self.command.has_printer() {
            debug!(command = self.command.name(), "defaulting to the standard printer");
            self.command.set_printer(Box::new(StandardPrinter::default()));
        }

        debug!(
            command = self.command.name(),
            entries = self.command.listing().len(),
            "command finalized"
        );
        Ok(self.command)
    }

    fn register(&mut self, builder: OptionBuilder) -> Result<Arc<OptionSpec>> {
        let option = builder.finalize()?;

        if self.command.contains_option(option.name()) {
            return Err(ConfigurationError::DuplicateOption {
                command: self.command.name().to_string(),
                option: option.name().to_string(),
            });
        }
        if let Some(flag) = option
            .flags()
            .find(|flag| self.command.find_flag(flag).is_some())
        {
            return Err(ConfigurationError::DuplicateFlag {
                command: self.command.name().to_string(),
                flag: flag.to_string(),
            });
        }

        let option = Arc::new(option);
        self.command.register_option(Arc::clone(&option));
        debug!(
            command = self.command.name(),
            option = option.name(),
            "option registered"
        );
        Ok(option)
    }
}

fn param_label(name: &str, arity: Arity) -> Option<String> {
    match arity {
        Arity::Zero => None,
        Arity::One => Some(name.to_uppercase()),
        Arity::Many => Some(format!("{}+", name.to_uppercase())),
    }
}

/// Generates the four shapes of one cast kind, each as a plain method and
/// as a `_with` method taking a configuration mapping and a block.
macro_rules! declarations {
    ($($kind:ident: $(($method:ident, $with:ident, $shape:ident, $doc:literal)),+;)*) => {
        impl CommandBuilder {
            $($(
                #[doc = concat!("Declares a `", stringify!($kind), "` option ", $doc, ".")]
                pub fn $method(&mut self, name: &str, desc: &str) -> Result<Arc<OptionSpec>> {
                    self.$with(name, desc, None, |_| Ok(()))
                }

                #[doc = concat!("Declares a `", stringify!($kind), "` option ", $doc, ", applying `config` and then `block`.")]
                pub fn $with<F>(
                    &mut self,
                    name: &str,
                    desc: &str,
                    config: Option<&OptionConfig>,
                    block: F,
                ) -> Result<Arc<OptionSpec>>
                where
                    F: FnOnce(&mut OptionBuilder) -> Result<()>,
                {
                    self.declare(CastKind::$kind, Shape::$shape, name, desc, config, block)
                }
            )+)*
        }
    };
}

macro_rules! kinds {
    ($($kind:ident: $one:ident/$one_with:ident, $many:ident/$many_with:ident, $long_one:ident/$long_one_with:ident, $long_many:ident/$long_many_with:ident;)*) => {
        declarations! {
            $(
                $kind:
                    ($one, $one_with, ONE, "with a short flag, taking one value"),
                    ($many, $many_with, MANY, "with a short flag, taking many values"),
                    ($long_one, $long_one_with, LONG_ONE, "without a short flag, taking one value"),
                    ($long_many, $long_many_with, LONG_MANY, "without a short flag, taking many values");
            )*
        }
    };
}

kinds! {
    String: string/string_with, strings/strings_with, string_/string_with_, strings_/strings_with_;
    Symbol: symbol/symbol_with, symbols/symbols_with, symbol_/symbol_with_, symbols_/symbols_with_;
    Integer: integer/integer_with, integers/integers_with, integer_/integer_with_, integers_/integers_with_;
    Float: float/float_with, floats/floats_with, float_/float_with_, floats_/floats_with_;
    Filepath: filepath/filepath_with, filepaths/filepaths_with, filepath_/filepath_with_, filepaths_/filepaths_with_;
    File: file/file_with, files/files_with, file_/file_with_, files_/files_with_;
    Yaml: yaml/yaml_with, yamls/yamls_with, yaml_/yaml_with_, yamls_/yamls_with_;
}

#[cfg(test)]
mod tests {
    use optspec_core::Value;

    use super::*;

    fn builder() -> CommandBuilder {
        CommandBuilder::new("test").unwrap()
    }

    #[test]
    fn test_declaration_table_covers_every_kind() {
        for kind in Converter::kinds().iter().filter(|k| !k.is_boolean()) {
            let tag = kind.tag();
            let expected = [
                (tag.to_string(), Shape::ONE),
                (format!("{tag}s"), Shape::MANY),
                (format!("{tag}_"), Shape::LONG_ONE),
                (format!("{tag}s_"), Shape::LONG_MANY),
            ];
            for (method, shape) in expected {
                assert_eq!(
                    CommandBuilder::declaration(&method),
                    Some((*kind, shape)),
                    "{method}"
                );
            }
        }
    }

    #[test]
    fn test_declaration_table_aliases() {
        assert_eq!(
            CommandBuilder::declaration("bool_"),
            Some((CastKind::Boolean, Shape::LONG_FLAG))
        );
        assert_eq!(
            CommandBuilder::declaration("multiple"),
            Some((CastKind::String, Shape::MANY))
        );
        assert_eq!(
            CommandBuilder::declaration("ints"),
            Some((CastKind::Integer, Shape::MANY))
        );
        assert_eq!(CommandBuilder::declaration("booleans"), None);
        assert_eq!(CommandBuilder::declaration("date"), None);
    }

    #[test]
    fn test_declaration_names_are_case_sensitive() {
        assert_eq!(CommandBuilder::declaration("Integer"), None);
        assert_eq!(CommandBuilder::declaration("FLOATS_"), None);
        assert_eq!(CommandBuilder::declaration("Boolean"), None);
        assert!(matches!(
            builder().declare_by_method("Integer", "depth", "Depth", None),
            Err(ConfigurationError::UnknownDeclaration(_))
        ));
    }

    #[test]
    fn test_generated_shapes() {
        let mut b = builder();
        let cases = [
            (b.float("alpha", "A").unwrap(), true, Arity::One),
            (b.floats("beta", "B").unwrap(), true, Arity::Many),
            (b.float_("gamma", "C").unwrap(), false, Arity::One),
            (b.floats_("delta", "D").unwrap(), false, Arity::Many),
        ];
        for (option, short, arity) in cases {
            assert_eq!(option.short_flag().is_some(), short, "{}", option.name());
            assert_eq!(option.arity(), arity);
            assert_eq!(option.cast(), Some(CastKind::Float));
        }
    }

    #[test]
    fn test_every_kind_gets_four_shapes() {
        for kind in Converter::kinds().iter().filter(|k| !k.is_boolean()) {
            let tag = kind.tag();
            let mut b = builder();
            let methods = [
                (tag.to_string(), true, Arity::One),
                (format!("{tag}s"), true, Arity::Many),
                (format!("{tag}_"), false, Arity::One),
                (format!("{tag}s_"), false, Arity::Many),
            ];
            for (i, (method, short, arity)) in methods.iter().enumerate() {
                let name = format!("{}_Opt_{i}", ["alpha", "beta", "gamma", "delta"][i]);
                let option = b.declare_by_method(method, &name, "Desc", None).unwrap();
                assert_eq!(option.short_flag().is_some(), *short, "{method}");
                assert_eq!(option.arity(), *arity, "{method}");
                assert_eq!(option.cast(), Some(*kind), "{method}");
                assert_eq!(
                    option.long_flag(),
                    Some(format!("--{}", name.to_lowercase().replace('_', "-")).as_str()),
                    "{method}"
                );
            }
        }
    }

    #[test]
    fn test_long_flag_and_param_derivation() {
        let mut b = builder();
        let option = b.integers("Max_Depth", "Depth").unwrap();
        assert_eq!(option.long_flag(), Some("--max-depth"));
        assert_eq!(option.short_flag(), Some("-M"));
        assert_eq!(option.metaname(), Some("MAX_DEPTH+"));
    }

    #[test]
    fn test_single_and_multiple_match_string_declarations() {
        let mut b = builder();
        let single = b.single("name", "Name").unwrap();
        let mut b = builder();
        let string = b.string("name", "Name").unwrap();
        assert_eq!(single.short_flag(), string.short_flag());
        assert_eq!(single.long_flag(), string.long_flag());
        assert_eq!(single.arity(), string.arity());
        assert_eq!(single.cast(), string.cast());
        assert_eq!(single.metaname(), string.metaname());

        let mut b = builder();
        let multiple = b.multiple_("names", "Names").unwrap();
        let mut b = builder();
        let strings = b.strings_("names", "Names").unwrap();
        assert_eq!(multiple.short_flag(), strings.short_flag());
        assert_eq!(multiple.arity(), strings.arity());
        assert_eq!(multiple.metaname(), strings.metaname());
    }

    #[test]
    fn test_boolean_declarations() {
        let mut b = builder();
        let count = b.boolean("count", "The count").unwrap();
        let quiet = b.bool_("quiet", "Quiet").unwrap();
        assert_eq!(count.short_flag(), Some("-c"));
        assert_eq!(count.metaname(), None);
        assert_eq!(count.default_value(), Some(&Value::Bool(false)));
        assert_eq!(quiet.short_flag(), None);
        assert_eq!(quiet.arity(), Arity::Zero);
    }

    #[test]
    fn test_negated_boolean_through_boolean_with() {
        let mut b = builder();
        let config = OptionConfig::new().negation("no");
        let force = b.boolean_with("force", "Force", Some(&config), |_| Ok(())).unwrap();
        assert_eq!(force.short_flag(), Some("-f"));
        assert_eq!(force.negated_flag(), Some("--no-force"));
        assert_eq!(force.default_value(), Some(&Value::Bool(false)));

        let color = b
            .bool_with_("color", "Colour output", None, |o| {
                o.negate("no");
                Ok(())
            })
            .unwrap();
        assert_eq!(color.short_flag(), None);
        assert!(b.command().find_flag("--no-color").is_some());
    }

    #[test]
    fn test_with_variants_apply_config_then_block() {
        let mut b = builder();
        let config = OptionConfig::new().short("-n").default_value(Value::Integer(2));
        let count = b
            .integers_with("count", "Counts", Some(&config), |o| {
                o.desc("Overridden");
                Ok(())
            })
            .unwrap();
        assert_eq!(count.short_flag(), Some("-n"));
        assert_eq!(count.arity(), Arity::Many);
        assert_eq!(count.description(), Some("Overridden"));
        assert_eq!(count.default_value(), Some(&Value::Integer(2)));

        let mode = b
            .single_with_("mode", "Mode", None, |o| {
                o.restricted(["fast", "slow"]);
                Ok(())
            })
            .unwrap();
        assert_eq!(mode.short_flag(), None);
        assert_eq!(mode.restricted(), Some(&["fast".to_string(), "slow".to_string()][..]));
    }

    #[test]
    fn test_config_then_block_order() {
        let mut b = builder();
        let config = OptionConfig::new().short("-x").default_value(5);
        let option = b
            .declare(
                CastKind::Integer,
                Shape::ONE,
                "level",
                "Level",
                Some(&config),
                |o| {
                    o.short("-L");
                    Ok(())
                },
            )
            .unwrap();
        assert_eq!(option.short_flag(), Some("-L"));
        assert_eq!(option.default_value(), Some(&Value::Integer(5)));
    }

    #[test]
    fn test_block_error_propagates() {
        let mut b = builder();
        let err = b
            .declare(CastKind::String, Shape::ONE, "name", "Name", None, |_| {
                Err(ConfigurationError::MalformedDeclaration("nope".to_string()))
            })
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::MalformedDeclaration(_)));
        assert!(b.command().option("name").is_none());
    }

    #[test]
    fn test_help_option() {
        let mut b = builder();
        let help = b.help(None).unwrap();
        assert!(help.description().unwrap().contains("Show this help message"));
        assert_eq!(help.short_flag(), Some("-h"));

        let step = help.validation_step().unwrap();
        assert_eq!(step(&[]).unwrap(), Flow::Help(None));
        assert_eq!(
            step(&["foo".to_string()]).unwrap(),
            Flow::Help(Some("foo".to_string()))
        );
    }

    #[test]
    fn test_version_option() {
        let mut b = builder();
        let version = b.version("tool 1.2.3").unwrap();
        assert_eq!(version.long_flag(), Some("--version"));
        assert_eq!(version.short_flag(), None);
        let step = version.validation_step().unwrap();
        assert_eq!(step(&[]).unwrap(), Flow::Version("tool 1.2.3".to_string()));
    }

    #[test]
    fn test_duplicate_name_and_flag() {
        let mut b = builder();
        b.boolean("count", "Count").unwrap();
        assert!(matches!(
            b.integer_("count", "Again"),
            Err(ConfigurationError::DuplicateOption { .. })
        ));
        assert_eq!(
            b.boolean("color", "Color").unwrap_err(),
            ConfigurationError::DuplicateFlag {
                command: "test".to_string(),
                flag: "-c".to_string(),
            }
        );
        assert_eq!(b.command().listing().len(), 1);
    }

    #[test]
    fn test_separator_does_not_register() {
        let mut b = builder();
        b.separator(None).separator(Some("Extras"));
        b.boolean("all", "All").unwrap();
        let command = b.finalize().unwrap();
        assert_eq!(command.listing().len(), 3);
        assert_eq!(command.options().count(), 1);
        assert!(matches!(&command.listing()[0], Entry::Separator(text) if text.is_empty()));
    }

    #[test]
    fn test_finalize_rejects_unknown_dependency() {
        let mut b = builder();
        b.string("output", "Output").unwrap();
        b.option("format", |o| {
            o.long("--format").param(Some("FORMAT")).dependencies(["output", "dir"]);
            Ok(())
        })
        .unwrap();
        assert_eq!(
            b.finalize().unwrap_err(),
            ConfigurationError::UnknownDependency {
                option: "format".to_string(),
                dependency: "dir".to_string(),
            }
        );
    }

    #[test]
    fn test_finalize_defaults_printer() {
        let command = builder().finalize().unwrap();
        assert!(command.printer().is_some());
    }

    #[test]
    fn test_arguments_step() {
        let mut b = builder();
        b.arguments(|tokens| {
            if tokens.is_empty() {
                return Err(optspec_core::ValidationError::Rejected(
                    "expected a file".to_string(),
                ));
            }
            Ok(Flow::Continue(Value::Integer(tokens.len() as i64)))
        });
        let command = b.finalize().unwrap();
        let arguments = command.arguments().unwrap();
        assert!(arguments.validate(&[]).is_err());
        assert_eq!(
            arguments.validate(&["a".to_string()]).unwrap(),
            Flow::Continue(Value::Integer(1))
        );
    }

    #[test]
    fn test_option_from_declaration() {
        let mut b = builder();
        b.string("output", "Output").unwrap();
        let decl: Yaml = serde_yaml::from_str("{ format: { long: --format, cast: symbol, dependencies: [output] } }").unwrap();
        let option = b.option_from(&decl).unwrap();
        assert_eq!(option.cast(), Some(CastKind::Symbol));
        assert!(b.finalize().is_ok());
    }
}
