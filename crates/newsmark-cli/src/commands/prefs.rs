//! Preference command handlers

use anyhow::Result;

use newsmark_core::{Backend, PreferencesPatch, PreferencesStore, Theme};

use crate::output::Output;

type Prefs<'a> = PreferencesStore<&'a dyn Backend>;

/// Show current preferences
pub fn show(store: &Prefs<'_>, output: &Output) -> Result<()> {
    output.print_preferences(store.preferences());
    Ok(())
}

/// Mark an article URL as read
pub fn read(store: &mut Prefs<'_>, url: String, output: &Output) -> Result<()> {
    if store.mark_as_read(&url)? {
        output.success(&format!("Marked as read: {}", url));
    } else {
        output.message(&format!("Already read: {}", url));
    }
    Ok(())
}

/// Toggle a favourite category
pub fn favorite(store: &mut Prefs<'_>, category: String, output: &Output) -> Result<()> {
    if store.toggle_favorite_category(&category)? {
        output.success(&format!("Added favorite: {}", category));
    } else {
        output.success(&format!("Removed favorite: {}", category));
    }
    Ok(())
}

/// Set the colour theme
pub fn theme(store: &mut Prefs<'_>, theme: Theme, output: &Output) -> Result<()> {
    store.update(PreferencesPatch {
        theme: Some(theme),
        ..Default::default()
    });
    output.success(&format!("Theme set to {}", theme));
    Ok(())
}

/// Set the preferred language
pub fn language(store: &mut Prefs<'_>, code: String, output: &Output) -> Result<()> {
    let code = code.trim().to_lowercase();
    if code.is_empty() {
        anyhow::bail!("Language code must not be empty");
    }
    store.update(PreferencesPatch {
        language: Some(code.clone()),
        ..Default::default()
    });
    output.success(&format!("Language set to {}", code));
    Ok(())
}

/// Restore default preferences
pub fn reset(store: &mut Prefs<'_>, output: &Output) -> Result<()> {
    store.reset();
    output.success("Preferences reset");
    Ok(())
}
