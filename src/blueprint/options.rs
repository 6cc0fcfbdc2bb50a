use derive_builder::Builder;

/// User choices for a single blueprint run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Builder)]
#[builder(default)]
pub struct BlueprintOptions {
    /// Don't run the package manager.
    pub skip_dependency_install: bool,
    /// Don't create a git repository.
    pub skip_vcs_init: bool,
    /// Tag, branch or commit of the template. The default revision when unset.
    #[builder(setter(into, strip_option))]
    pub template_ref: Option<String>,
    /// Surface transfer messages and full error diagnostics.
    pub verbose: bool,
}

impl BlueprintOptions {
    /// Create a new [`BlueprintOptions`] builder
    #[must_use]
    pub fn builder() -> BlueprintOptionsBuilder {
        BlueprintOptionsBuilder::default()
    }
}
