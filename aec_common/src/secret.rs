use std::fmt;

/// A wrapper that keeps credentials out of logs and error messages.
///
/// Both [`fmt::Debug`] and [`fmt::Display`] print `[REDACTED]`, so a `Secret` can sit inside a `#[derive(Debug)]`
/// config struct without leaking. The wrapped value is only reachable through [`Secret::reveal`] (a borrow) or
/// [`Secret::into_inner`] (consuming), which makes every disclosure site greppable.
#[derive(Clone, Default)]
pub struct Secret<T>(T);

impl<T> Secret<T> {
    pub fn new(value: T) -> Self {
        Self(value)
    }

    /// Borrow the wrapped value. Call this only at the point the credential is actually used.
    pub fn reveal(&self) -> &T {
        &self.0
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> From<T> for Secret<T> {
    fn from(value: T) -> Self {
        Self(value)
    }
}

impl<T> fmt::Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl<T> fmt::Display for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}
