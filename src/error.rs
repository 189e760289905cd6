use std::any::Any;

/// Trait for errors that may be returned while configuring the provider. This just sets up the
/// trait bounds that are required, since the provider only exposes rather opaque boxed
/// error types, and they need to be sent between threads.
pub trait ProviderError: std::error::Error + Send + Sync + 'static + Any {
    fn as_any(&self) -> &dyn Any;
}
impl<T> ProviderError for T
where
    T: std::error::Error + Send + Sync + 'static + Any,
{
    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub type Error = Box<dyn ProviderError>;

impl dyn ProviderError {
    /// convenience function for downcasting the error to a concrete type
    pub fn as_type<T: ProviderError>(&self) -> Option<&T> {
        let as_any = self.as_any();
        as_any.downcast_ref::<T>()
    }

    /// convenience function for checking whether the error is of the given concrete type.
    /// If `is_type::<MyType>()` returns true, then calling `as_type::<MyType>()` will return
    /// `Some`.
    pub fn is_type<T: ProviderError>(&self) -> bool {
        let as_any = self.as_any();
        as_any.is::<T>()
    }
}

impl<T> From<T> for Error
where
    T: ProviderError,
{
    fn from(e: T) -> Error {
        Box::new(e)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::kubeconfig::KubeConfigError;

    #[test]
    fn boxed_error_can_be_downcast_to_its_concrete_type() {
        let err: Error = KubeConfigError::NoHomeDir.into();
        assert!(err.is_type::<KubeConfigError>());
        assert!(!err.is_type::<std::io::Error>());
        match err.as_type::<KubeConfigError>() {
            Some(KubeConfigError::NoHomeDir) => {}
            other => panic!("expected NoHomeDir, got: {:?}", other),
        }
    }
}
