//! One-shot notifications shown at the top of a page.
//!
//! A toast survives a redirect as a `?toast=<code>` query parameter.

use serde::Deserialize;

/// Success or error styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

impl ToastKind {
    /// CSS class suffix.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

/// Every notification the dashboard can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toast {
    LoggedIn,
    AccessError,
    AccountCreated,
    RegisterError,
    FillAllFields,
    ProductCreated,
    ProductError,
    CategoryCreated,
    CategoryNameRequired,
    CategoryError,
}

impl Toast {
    const ALL: [Self; 10] = [
        Self::LoggedIn,
        Self::AccessError,
        Self::AccountCreated,
        Self::RegisterError,
        Self::FillAllFields,
        Self::ProductCreated,
        Self::ProductError,
        Self::CategoryCreated,
        Self::CategoryNameRequired,
        Self::CategoryError,
    ];

    #[must_use]
    pub const fn kind(self) -> ToastKind {
        match self {
            Self::LoggedIn | Self::AccountCreated | Self::ProductCreated | Self::CategoryCreated => {
                ToastKind::Success
            }
            Self::AccessError
            | Self::RegisterError
            | Self::FillAllFields
            | Self::ProductError
            | Self::CategoryNameRequired
            | Self::CategoryError => ToastKind::Error,
        }
    }

    /// Text shown to the user.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::LoggedIn => "Successfully logged in",
            Self::AccessError => "Error accessing",
            Self::AccountCreated => "Account created successfully",
            Self::RegisterError => "Error when registering",
            Self::FillAllFields => "Preencha todos os campos",
            Self::ProductCreated => "Produto cadastrado com sucesso",
            Self::ProductError => "Ops! Erro ao cadastrar",
            Self::CategoryCreated => "Category created",
            Self::CategoryNameRequired => "Enter a category name",
            Self::CategoryError => "Error creating category",
        }
    }

    /// Query-string code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::LoggedIn => "logged_in",
            Self::AccessError => "access_error",
            Self::AccountCreated => "account_created",
            Self::RegisterError => "register_error",
            Self::FillAllFields => "fill_all_fields",
            Self::ProductCreated => "product_created",
            Self::ProductError => "product_error",
            Self::CategoryCreated => "category_created",
            Self::CategoryNameRequired => "category_name_required",
            Self::CategoryError => "category_error",
        }
    }

    /// Parse a query-string code. Unknown codes are dropped.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|toast| toast.code() == code)
    }

    /// `path` with this toast attached.
    #[must_use]
    pub fn redirect_path(self, path: &str) -> String {
        format!("{path}?toast={}", self.code())
    }
}

/// `?toast=` query parameter.
#[derive(Debug, Default, Deserialize)]
pub struct ToastQuery {
    pub toast: Option<String>,
}

impl ToastQuery {
    #[must_use]
    pub fn toast(&self) -> Option<Toast> {
        self.toast.as_deref().and_then(Toast::from_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_unique_and_parse_back() {
        for toast in Toast::ALL {
            assert_eq!(Toast::from_code(toast.code()), Some(toast));
        }
    }

    #[test]
    fn test_unknown_code_is_dropped() {
        let query = ToastQuery {
            toast: Some("<script>".into()),
        };
        assert_eq!(query.toast(), None);
    }

    #[test]
    fn test_kinds() {
        assert_eq!(Toast::LoggedIn.kind(), ToastKind::Success);
        assert_eq!(Toast::FillAllFields.kind(), ToastKind::Error);
        assert_eq!(Toast::ProductError.message(), "Ops! Erro ao cadastrar");
    }

    #[test]
    fn test_redirect_path() {
        assert_eq!(
            Toast::LoggedIn.redirect_path("/dashboard"),
            "/dashboard?toast=logged_in"
        );
    }
}
