use std::path::{Path, PathBuf};

use log::warn;
use rfd::{FileDialog, MessageButtons, MessageDialog, MessageLevel};

/// Tells the user an alarm went off.
pub trait Notifier: Send {
    /// blocks until the user dismisses the notice
    fn show(&self, message: &str);
}

/// Shows a desktop message box.
#[derive(Debug, Clone, Copy, Default)]
pub struct DialogNotifier;

impl Notifier for DialogNotifier {
    fn show(&self, message: &str) {
        MessageDialog::new()
            .set_level(MessageLevel::Warning)
            .set_title("Alarm")
            .set_description(message)
            .set_buttons(MessageButtons::Ok)
            .show();
    }
}

/// the sound files offered when picking a tone
const TONE_EXTENSIONS: [&str; 4] = ["mp3", "wav", "ogg", "flac"];

fn is_tone_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| TONE_EXTENSIONS.iter().any(|t| t.eq_ignore_ascii_case(ext)))
}

/// Lets the user pick a custom alarm tone, starting in their music folder.
/// Anything that isn't a sound file counts as no pick.
#[must_use]
pub fn pick_tone() -> Option<PathBuf> {
    let music =
        directories::UserDirs::new().and_then(|dirs| dirs.audio_dir().map(Path::to_path_buf));
    let mut picker = FileDialog::new()
        .set_title("Select Alarm Tone")
        .add_filter("Audio Files", &TONE_EXTENSIONS);
    if let Some(music) = music {
        picker = picker.set_directory(music);
    }
    let picked = picker.pick_file()?;
    if is_tone_file(&picked) {
        Some(picked)
    } else {
        warn!("{} is not a sound file, using the default tone", picked.display());
        None
    }
}
