use tracing::debug;

use crate::completion::CompletionPipeline;
use crate::config::ShellConfig;

use super::completer::ShellCompleter;
use super::settings::ReplSettings;

/// One-shot REPL setup for the deker shell
#[derive(Debug, Clone)]
pub struct ShellConfigurator {
    config: ShellConfig,
}

impl ShellConfigurator {
    pub fn new(config: ShellConfig) -> Self {
        Self { config }
    }

    /// Apply prompts, title, dialogs, completion and colors to `settings`
    pub fn configure(&self, settings: &mut ReplSettings) {
        settings.in_prompt = self.config.in_prompt.clone();
        settings.continuation_prompt = self.config.continuation_prompt.clone();
        settings.out_prompt = self.config.out_prompt.clone();
        settings.title = self.config.title.clone();
        settings.confirm_exit = self.config.confirm_exit;
        settings.show_status_bar = self.config.show_status_bar;
        settings.color_scheme = self.config.color_scheme;
        settings.history = Some(self.config.history.clone());

        let pipeline = CompletionPipeline::for_scope(settings.scope.clone());
        settings.completer = Some(ShellCompleter::new(pipeline, settings.color_enabled()));

        debug!(
            "REPL configured: prompt '{}', color scheme {:?}",
            settings.in_prompt, settings.color_scheme
        );
    }
}
