use std::sync::{Arc, Mutex};

/// Name of the locale whose numeric formatting uses `.` as the decimal separator.
pub const C_LOCALE: &str = "C";

/// Access to the process-wide numeric locale (`LC_NUMERIC`).
///
/// Renderers that format numbers into shader or config text are sensitive to this setting, so the
/// export loop wraps each draw call in a [`NumericLocaleGuard`].
pub trait NumericLocale: Send + Sync {
    /// Current numeric locale name.
    fn numeric(&self) -> String;
    /// Switch the numeric locale.
    fn set_numeric(&self, name: &str);
}

/// In-process numeric locale slot shared between a renderer and its callers.
#[derive(Clone, Debug)]
pub struct SharedLocale(Arc<Mutex<String>>);

impl SharedLocale {
    /// Create a slot holding `initial`.
    pub fn new(initial: impl Into<String>) -> Self {
        Self(Arc::new(Mutex::new(initial.into())))
    }
}

impl Default for SharedLocale {
    fn default() -> Self {
        Self::new(C_LOCALE)
    }
}

impl NumericLocale for SharedLocale {
    fn numeric(&self) -> String {
        self.0.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn set_numeric(&self, name: &str) {
        *self.0.lock().unwrap_or_else(|e| e.into_inner()) = name.to_owned();
    }
}

/// Scoped `LC_NUMERIC` override.
///
/// Construction saves the current numeric locale and switches to `"C"`; dropping the guard
/// restores the saved value on every exit path.
pub struct NumericLocaleGuard {
    locale: Arc<dyn NumericLocale>,
    saved: String,
}

impl NumericLocaleGuard {
    /// Save the current locale and switch to `"C"`.
    pub fn new(locale: Arc<dyn NumericLocale>) -> Self {
        let saved = locale.numeric();
        if saved != C_LOCALE {
            locale.set_numeric(C_LOCALE);
        }
        Self { locale, saved }
    }

    /// The locale that will be restored on drop.
    pub fn saved(&self) -> &str {
        &self.saved
    }
}

impl Drop for NumericLocaleGuard {
    fn drop(&mut self) {
        if self.locale.numeric() != self.saved {
            self.locale.set_numeric(&self.saved);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/locale.rs"]
mod tests;
