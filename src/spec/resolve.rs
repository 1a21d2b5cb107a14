use super::{CompletionSpec, OptionSpec};

/// Whether hidden options take part in prefix resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Visibility {
    #[default]
    Default,
    IncludeHidden,
}

impl Visibility {
    #[inline]
    fn admits(self, option: &OptionSpec) -> bool {
        self == Visibility::IncludeHidden || !option.hidden
    }
}

impl CompletionSpec {
    /// Options of this command that have at least one alias starting with
    /// `prefix`, in declaration order.
    ///
    /// An empty prefix matches every option.
    pub fn resolve_options(&self, prefix: &str, visibility: Visibility) -> Vec<&OptionSpec> {
        self.options
            .iter()
            .filter(|option| visibility.admits(option))
            .filter(|option| option.matches_prefix(prefix))
            .collect()
    }

    /// The direct subcommand called exactly `token`, if there is one.
    pub fn resolve_subcommand(&self, token: &str) -> Option<&CompletionSpec> {
        self.subcommands.iter().find(|sub| sub.name == token)
    }

    /// The option that `token` spells, hidden or not.
    ///
    /// A long flag may carry an inline value, `--delay=2` finds `--delay`.
    pub fn find_option(&self, token: &str) -> Option<&OptionSpec> {
        let flag = match token.split_once('=') {
            Some((flag, _)) if flag.starts_with("--") => flag,
            _ => token,
        };

        self.options
            .iter()
            .find(|option| option.aliases().iter().any(|alias| alias == flag))
    }

    /// Follows leading subcommand names in `tokens` and returns the deepest
    /// command reached.
    ///
    /// The walk stops at the first token that does not name a subcommand of
    /// the current node, so an option or positional value ends it.
    pub fn descend<I, S>(&self, tokens: I) -> &CompletionSpec
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut node = self;
        for token in tokens {
            match node.resolve_subcommand(token.as_ref()) {
                Some(sub) => node = sub,
                None => break,
            }
        }
        node
    }
}
