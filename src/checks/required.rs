use url::Url;

/// "Is this field filled in?"
///
/// The one emptiness rule shared by every validator. Absent values, empty
/// strings and empty lists are missing; anything else is present. Strings
/// are not trimmed.
pub trait Required {
    fn is_present(&self) -> bool;
}

impl Required for str {
    fn is_present(&self) -> bool {
        !self.is_empty()
    }
}

impl Required for String {
    fn is_present(&self) -> bool {
        !self.is_empty()
    }
}

impl Required for Url {
    fn is_present(&self) -> bool {
        true
    }
}

impl<T> Required for [T] {
    fn is_present(&self) -> bool {
        !self.is_empty()
    }
}

impl<T> Required for Vec<T> {
    fn is_present(&self) -> bool {
        !self.is_empty()
    }
}

impl<T: Required> Required for Option<T> {
    fn is_present(&self) -> bool {
        self.as_ref().is_some_and(Required::is_present)
    }
}

impl<T: Required + ?Sized> Required for &T {
    fn is_present(&self) -> bool {
        (**self).is_present()
    }
}

/// Free-function form of [`Required::is_present`].
pub fn check_required<T: Required + ?Sized>(value: &T) -> bool {
    value.is_present()
}
