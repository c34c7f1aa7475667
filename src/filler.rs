//! Entry point: bind a schema, then parse a command line against it.

use std::fmt;
use std::sync::Arc;

use crate::binder::{RenameFn, Schema, Walker, default_renamer};
use crate::error::{Error, Result};
use crate::flagset::FlagSet;
use crate::node::{ParserNode, UsageNode};
use crate::registry::{self, TypeRegistry};
use crate::scanner;

/// What a failed parse does.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorHandling {
    /// Return the error to the caller.
    ContinueOnError,
    /// Print the error and usage to stderr and exit with status 2, or
    /// status 0 when help was requested.
    #[default]
    ExitOnError,
    PanicOnError,
}

#[derive(Clone)]
pub struct FillerConfig {
    pub renamer: RenameFn,
    pub error_handling: ErrorHandling,
    /// Option prefix, `-` unless changed.
    pub prefix: String,
    pub registry: Arc<TypeRegistry>,
}

impl Default for FillerConfig {
    fn default() -> Self {
        Self {
            renamer: default_renamer,
            error_handling: ErrorHandling::default(),
            prefix: "-".to_string(),
            registry: registry::global(),
        }
    }
}

impl fmt::Debug for FillerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FillerConfig")
            .field("error_handling", &self.error_handling)
            .field("prefix", &self.prefix)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl FillerConfig {
    pub fn with_renamer(mut self, renamer: RenameFn) -> Self {
        self.renamer = renamer;
        self
    }

    pub fn with_error_handling(mut self, error_handling: ErrorHandling) -> Self {
        self.error_handling = error_handling;
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_registry(mut self, registry: Arc<TypeRegistry>) -> Self {
        self.registry = registry;
        self
    }
}

/// Binds a struct to a tree of option scopes and fills it from arguments.
///
/// The filler borrows the struct mutably for `'a`; drop it to read the
/// parsed values.
pub struct Filler<'a> {
    root: ParserNode<'a>,
    config: FillerConfig,
}

impl<'a> Filler<'a> {
    /// `name` labels the root scope, `usage` is the overall description.
    pub fn new(name: impl Into<String>, usage: impl Into<String>) -> Self {
        Self::with_config(name, usage, FillerConfig::default())
    }

    pub fn with_config(
        name: impl Into<String>,
        usage: impl Into<String>,
        config: FillerConfig,
    ) -> Self {
        Self {
            root: ParserNode::new(name, usage, &config.prefix),
            config,
        }
    }

    pub fn config(&self) -> &FillerConfig {
        &self.config
    }

    /// Walk `schema` and bind every field. Any binding error aborts the walk.
    pub fn fill<S: Schema + ?Sized>(&mut self, schema: &'a mut S) -> Result<()> {
        let registry = Arc::clone(&self.config.registry);
        let mut walker = Walker::root(&mut self.root, &registry, self.config.renamer);
        schema.walk(&mut walker)?;
        tracing::debug!(
            root = self.root.name(),
            options = self.root.flags().len(),
            actions = self.root.actions().count(),
            "schema bound"
        );
        Ok(())
    }

    /// Parse the process arguments, skipping the program name.
    pub fn parse(&mut self) -> Result<Vec<String>> {
        self.parse_args(std::env::args().skip(1))
    }

    /// Parse `args`, returning the field names of the invoked actions.
    pub fn parse_args<I, T>(&mut self, args: I) -> Result<Vec<String>>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        let mut entered = Vec::new();
        match scanner::dispatch_within(&mut self.root, &args, &mut entered) {
            Ok(chain) => {
                tracing::debug!(?chain, "parsed");
                Ok(chain)
            }
            Err(err) => Err(self.handle(err, &entered)),
        }
    }

    /// `entered` holds the action tokens leading to the scope that failed.
    fn handle(&self, err: Error, entered: &[String]) -> Error {
        match self.config.error_handling {
            ErrorHandling::ContinueOnError => err,
            ErrorHandling::ExitOnError => {
                let usage = self.scope_usage(entered);
                if err.is_help() {
                    eprint!("{usage}");
                    std::process::exit(0);
                }
                eprintln!("{err}");
                eprint!("{usage}");
                std::process::exit(2);
            }
            ErrorHandling::PanicOnError => panic!("{err}"),
        }
    }

    pub fn root(&self) -> &ParserNode<'a> {
        &self.root
    }

    /// Options of the root scope.
    pub fn flagset(&self) -> &FlagSet<'a> {
        self.root.flags()
    }

    /// Usage text for the whole action tree.
    pub fn usage_str(&self) -> String {
        self.root.usage_str("")
    }

    /// Print [`Filler::usage_str`] to stdout.
    pub fn usage(&self) {
        println!("{}", self.usage_str());
    }

    /// Usage of the scope reached by following the action tokens in
    /// `actions` from the root, or empty when one of them is not an action.
    pub fn scope_usage<S: AsRef<str>>(&self, actions: &[S]) -> String {
        actions
            .iter()
            .try_fold(&self.root, |node, key| node.child(key.as_ref()))
            .map(|node| node.usage_str(""))
            .unwrap_or_default()
    }

    /// Usage of the root's child action declared under `field_name`, or empty.
    pub fn act_usage(&self, field_name: &str) -> String {
        self.root.act_usage(field_name)
    }

    pub fn usage_tree(&self) -> UsageNode {
        self.root.usage_tree()
    }

    pub fn usage_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.usage_tree())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::Field;
    use crate::error::{BindError, FlagError};
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct Job {
        retries: u8,
        run: Step,
    }

    #[derive(Default)]
    struct Step {
        dry: bool,
    }

    impl Schema for Step {
        fn walk<'a>(&'a mut self, walker: &mut Walker<'_, 'a>) -> std::result::Result<(), BindError> {
            walker.field(Field::new("dry"), &mut self.dry)
        }
    }

    impl Schema for Job {
        fn walk<'a>(&'a mut self, walker: &mut Walker<'_, 'a>) -> std::result::Result<(), BindError> {
            walker.field(Field::new("retries").with_usage("attempts"), &mut self.retries)?;
            walker.field(Field::new("run").as_action(), &mut self.run)
        }
    }

    fn continuing() -> FillerConfig {
        FillerConfig::default().with_error_handling(ErrorHandling::ContinueOnError)
    }

    #[test]
    fn default_config() {
        let config = FillerConfig::default();
        assert_eq!(config.error_handling, ErrorHandling::ExitOnError);
        assert_eq!(config.prefix, "-");
        assert_eq!((config.renamer)("a", "b_c", false), "a-b-c");
    }

    #[test]
    fn custom_prefix() {
        let mut job = Job::default();
        let chain = {
            let mut filler = Filler::with_config("job", "", continuing().with_prefix("+"));
            filler.fill(&mut job).unwrap();
            filler.parse_args(["+retries", "3", "run", "+dry"]).unwrap()
        };
        assert_eq!(chain, vec!["run"]);
        assert_eq!(job.retries, 3);
        assert!(job.run.dry);
    }

    #[test]
    fn help_is_reported_in_continue_mode() {
        let mut job = Job::default();
        let mut filler = Filler::with_config("job", "", continuing());
        filler.fill(&mut job).unwrap();
        let err = filler.parse_args(["-help"]).unwrap_err();
        assert!(err.is_help());
        let err = filler.parse_args(["run", "-h"]).unwrap_err();
        assert_eq!(err, Error::Flag(FlagError::Help));
    }

    #[test]
    #[should_panic(expected = "found unrecognized action")]
    fn panic_mode_panics() {
        let mut job = Job::default();
        let config = FillerConfig::default().with_error_handling(ErrorHandling::PanicOnError);
        let mut filler = Filler::with_config("job", "", config);
        filler.fill(&mut job).unwrap();
        let _ = filler.parse_args(["walk"]);
    }

    #[test]
    fn act_usage_by_field_name() {
        let mut job = Job::default();
        let mut filler = Filler::with_config("job", "a job", continuing());
        filler.fill(&mut job).unwrap();
        assert_eq!(filler.act_usage("run"), "\n  - dry: \n  \tdefault:false\n");
        assert_eq!(filler.flagset().len(), 1);
    }

    #[test]
    fn scope_usage_follows_action_tokens() {
        let mut job = Job::default();
        let mut filler = Filler::with_config("job", "a job", continuing());
        filler.fill(&mut job).unwrap();
        assert_eq!(filler.scope_usage(&["run"]), filler.act_usage("run"));
        assert_eq!(filler.scope_usage::<&str>(&[]), filler.usage_str());
        assert_eq!(filler.scope_usage(&["walk"]), "");
    }
}
