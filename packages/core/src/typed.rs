//! Typed put/get extension trait.

use crate::{ConfigurationInterface, Error};

/// A value type the typed accessors can put and get.
///
/// Implemented for `String`, `i64`, `i32` and `f64`, each dispatching to the
/// matching string, integer or float operation of the interface.
pub trait ConfigValue: Sized {
    fn put_into<C: ConfigurationInterface + ?Sized>(
        self,
        configuration: &mut C,
        path: &str,
    ) -> Result<(), Error>;

    fn get_from<C: ConfigurationInterface + ?Sized>(
        configuration: &mut C,
        path: &str,
    ) -> Result<Option<Self>, Error>;
}

impl ConfigValue for String {
    fn put_into<C: ConfigurationInterface + ?Sized>(
        self,
        configuration: &mut C,
        path: &str,
    ) -> Result<(), Error> {
        configuration.put_string(path, &self)
    }

    fn get_from<C: ConfigurationInterface + ?Sized>(
        configuration: &mut C,
        path: &str,
    ) -> Result<Option<Self>, Error> {
        configuration.get_string(path)
    }
}

impl ConfigValue for i64 {
    fn put_into<C: ConfigurationInterface + ?Sized>(
        self,
        configuration: &mut C,
        path: &str,
    ) -> Result<(), Error> {
        configuration.put_int(path, self)
    }

    fn get_from<C: ConfigurationInterface + ?Sized>(
        configuration: &mut C,
        path: &str,
    ) -> Result<Option<Self>, Error> {
        configuration.get_int(path)
    }
}

impl ConfigValue for i32 {
    fn put_into<C: ConfigurationInterface + ?Sized>(
        self,
        configuration: &mut C,
        path: &str,
    ) -> Result<(), Error> {
        configuration.put_int(path, i64::from(self))
    }

    /// Out-of-range integers are a conversion error, not a truncation.
    fn get_from<C: ConfigurationInterface + ?Sized>(
        configuration: &mut C,
        path: &str,
    ) -> Result<Option<Self>, Error> {
        let Some(wide) = configuration.get_int(path)? else {
            return Ok(None);
        };
        i32::try_from(wide).map(Some).map_err(|_| Error::Conversion {
            path: path.to_owned(),
            value: wide.to_string(),
            target: "32-bit integer",
        })
    }
}

impl ConfigValue for f64 {
    fn put_into<C: ConfigurationInterface + ?Sized>(
        self,
        configuration: &mut C,
        path: &str,
    ) -> Result<(), Error> {
        configuration.put_float(path, self)
    }

    fn get_from<C: ConfigurationInterface + ?Sized>(
        configuration: &mut C,
        path: &str,
    ) -> Result<Option<Self>, Error> {
        configuration.get_float(path)
    }
}

/// Extension trait for typed puts and gets.
///
/// This trait is automatically implemented for every `ConfigurationInterface`,
/// including `dyn ConfigurationInterface`.
///
/// # Example
///
/// ```rust,ignore
/// use configuration_core::ConfigurationExt;
///
/// configuration.put("server/port", 8080_i64)?;
/// let port: Option<i64> = configuration.get("server/port")?;
/// ```
pub trait ConfigurationExt: ConfigurationInterface {
    fn put<V: ConfigValue>(&mut self, path: &str, value: V) -> Result<(), Error> {
        value.put_into(self, path)
    }

    fn get<V: ConfigValue>(&mut self, path: &str) -> Result<Option<V>, Error> {
        V::get_from(self, path)
    }
}

// Blanket implementation for all backends
impl<C: ConfigurationInterface + ?Sized> ConfigurationExt for C {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::tests::TestBackend;

    #[test]
    fn typed_round_trips() {
        let mut backend = TestBackend::default();
        backend.put("s", "text".to_string()).unwrap();
        backend.put("i", 42_i64).unwrap();
        backend.put("small", -7_i32).unwrap();
        backend.put("f", 0.25_f64).unwrap();

        assert_eq!(backend.get::<String>("s").unwrap().as_deref(), Some("text"));
        assert_eq!(backend.get::<i64>("i").unwrap(), Some(42));
        assert_eq!(backend.get::<i32>("small").unwrap(), Some(-7));
        assert_eq!(backend.get::<f64>("f").unwrap(), Some(0.25));
        assert_eq!(backend.get::<i64>("missing").unwrap(), None);
    }

    #[test]
    fn typed_put_matches_string_put() {
        let mut backend = TestBackend::default();
        backend.put("n", 12_i32).unwrap();
        assert_eq!(backend.get_string("n").unwrap().as_deref(), Some("12"));
    }

    #[test]
    fn i32_overflow_is_conversion_error() {
        let mut backend = TestBackend::default();
        backend.put_int("big", i64::from(i32::MAX) + 1).unwrap();
        assert!(matches!(
            backend.get::<i32>("big"),
            Err(Error::Conversion { .. })
        ));
    }

    #[test]
    fn works_through_dyn() {
        let mut boxed: Box<dyn ConfigurationInterface> = Box::new(TestBackend::default());
        boxed.put("x", 1.5_f64).unwrap();
        assert_eq!(boxed.get::<f64>("x").unwrap(), Some(1.5));

        let dynamic: &mut dyn ConfigurationInterface = boxed.as_mut();
        assert_eq!(dynamic.get::<String>("x").unwrap().as_deref(), Some("1.5"));
    }
}
