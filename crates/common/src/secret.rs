//! Redacting wrapper for credentials held in memory

use std::fmt;
use zeroize::Zeroize;

/// Sensitive value, printed as `[REDACTED]` and wiped on drop
pub struct Secret<T: Zeroize>(T);

impl<T: Zeroize> Secret<T> {
    pub fn new(value: T) -> Self {
        Self(value)
    }

    /// Borrow the inner value. Keep the borrow short and never log it.
    pub fn expose(&self) -> &T {
        &self.0
    }
}

impl<T: Zeroize> From<T> for Secret<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<T: Zeroize> fmt::Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl<T: Zeroize> fmt::Display for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl<T: Zeroize> Drop for Secret<T> {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl<T: Zeroize + Clone> Clone for Secret<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_is_redacted_in_debug_and_display() {
        let password = Secret::new(String::from("hunter2"));
        assert_eq!(format!("{password:?}"), "[REDACTED]");
        assert_eq!(format!("{password}"), "[REDACTED]");
    }

    #[test]
    fn redaction_survives_nesting_in_structs() {
        #[derive(Debug)]
        #[allow(dead_code)]
        struct Login {
            email: String,
            password: Secret<String>,
        }

        let login = Login {
            email: "pm@example.com".into(),
            password: "hunter2".to_string().into(),
        };
        let debug = format!("{login:?}");
        assert!(debug.contains("pm@example.com"));
        assert!(!debug.contains("hunter2"), "got: {debug}");
    }

    #[test]
    fn clone_exposes_same_value() {
        let original = Secret::new(String::from("hunter2"));
        let cloned = original.clone();
        assert_eq!(cloned.expose(), "hunter2");
        assert_eq!(original.expose(), cloned.expose());
    }
}
