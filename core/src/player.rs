use std::process::Stdio;

use tokio::process::Child;
use tokio::process::Command;

use crate::error::PlayerError;

/// Sink for clip playback.
///
/// `load` only sets the source; `play` may be refused (no player, launch
/// failure) without affecting the loaded source.
pub trait MediaPlayer {
    fn load(&mut self, url: &str);

    fn play(&mut self) -> Result<(), PlayerError>;

    /// Halt playback and drop the source.
    fn stop(&mut self);

    fn source(&self) -> Option<&str>;
}

/// Hands the clip URL to an external program such as `mpv` or `vlc`.
#[derive(Debug, Default)]
pub struct ExternalPlayer {
    command: Option<Vec<String>>,
    source: Option<String>,
    child: Option<Child>,
}

impl ExternalPlayer {
    /// `command` is the program followed by its arguments; the clip URL is
    /// appended at launch.
    pub fn new(command: Option<Vec<String>>) -> Self {
        let command = command.filter(|argv| !argv.is_empty());
        Self {
            command,
            source: None,
            child: None,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.command.is_some()
    }

    /// Blocks until the launched player exits. Returns at once when nothing
    /// is running.
    pub async fn wait(&mut self) -> Result<(), PlayerError> {
        if let Some(child) = self.child.as_mut() {
            let status = child.wait().await.map_err(PlayerError::Wait)?;
            tracing::debug!(%status, "media player exited");
        }
        self.child = None;
        Ok(())
    }

    fn kill_child(&mut self) {
        if let Some(mut child) = self.child.take()
            && let Err(err) = child.start_kill()
        {
            tracing::debug!("media player already gone: {err}");
        }
    }
}

impl MediaPlayer for ExternalPlayer {
    fn load(&mut self, url: &str) {
        self.kill_child();
        self.source = Some(url.to_string());
    }

    fn play(&mut self) -> Result<(), PlayerError> {
        let source = self.source.clone().ok_or(PlayerError::NothingLoaded)?;
        let argv = self.command.clone().ok_or(PlayerError::NotConfigured)?;
        let Some((program, args)) = argv.split_first() else {
            return Err(PlayerError::NotConfigured);
        };
        self.kill_child();
        let child = Command::new(program)
            .args(args)
            .arg(&source)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| PlayerError::Launch {
                program: program.clone(),
                source,
            })?;
        tracing::info!(program = %program, url = %source, "launched media player");
        self.child = Some(child);
        Ok(())
    }

    fn stop(&mut self) {
        self.kill_child();
        self.source = None;
    }

    fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }
}
