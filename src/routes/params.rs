use crate::error::{AppError, AppResult, FieldError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn from_param(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "asc" => Some(SortOrder::Asc),
            "desc" => Some(SortOrder::Desc),
            _ => None,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// A whitelisted sort column. Query text only ever sees `as_sql()`.
pub trait SortKey: Sized + Copy {
    const DEFAULT: Self;
    const ALLOWED: &'static [&'static str];

    fn from_param(raw: &str) -> Option<Self>;
    fn as_sql(&self) -> &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminStoreSort {
    Id,
    Name,
    Email,
    Address,
    CreatedAt,
    AverageRating,
    OwnerName,
}

impl SortKey for AdminStoreSort {
    const DEFAULT: Self = AdminStoreSort::Id;
    const ALLOWED: &'static [&'static str] = &[
        "id",
        "name",
        "email",
        "address",
        "created_at",
        "averageRating",
        "owner_name",
    ];

    fn from_param(raw: &str) -> Option<Self> {
        match raw {
            "id" | "store_id" => Some(AdminStoreSort::Id),
            "name" => Some(AdminStoreSort::Name),
            "email" => Some(AdminStoreSort::Email),
            "address" => Some(AdminStoreSort::Address),
            "created_at" => Some(AdminStoreSort::CreatedAt),
            "averageRating" => Some(AdminStoreSort::AverageRating),
            "owner_name" => Some(AdminStoreSort::OwnerName),
            _ => None,
        }
    }

    fn as_sql(&self) -> &'static str {
        match self {
            AdminStoreSort::Id => "s.id",
            AdminStoreSort::Name => "s.name",
            AdminStoreSort::Email => "s.email",
            AdminStoreSort::Address => "s.address",
            AdminStoreSort::CreatedAt => "s.created_at",
            AdminStoreSort::AverageRating => "average_rating",
            AdminStoreSort::OwnerName => "owner_name",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserStoreSort {
    Name,
    Address,
    AverageRating,
}

impl SortKey for UserStoreSort {
    const DEFAULT: Self = UserStoreSort::Name;
    const ALLOWED: &'static [&'static str] = &["name", "address", "averageRating"];

    fn from_param(raw: &str) -> Option<Self> {
        match raw {
            "name" => Some(UserStoreSort::Name),
            "address" => Some(UserStoreSort::Address),
            "averageRating" => Some(UserStoreSort::AverageRating),
            _ => None,
        }
    }

    fn as_sql(&self) -> &'static str {
        match self {
            UserStoreSort::Name => "s.name",
            UserStoreSort::Address => "s.address",
            UserStoreSort::AverageRating => "average_rating",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserSort {
    Id,
    Name,
    Email,
    Role,
    CreatedAt,
}

impl SortKey for UserSort {
    const DEFAULT: Self = UserSort::Id;
    const ALLOWED: &'static [&'static str] = &["id", "name", "email", "role", "created_at"];

    fn from_param(raw: &str) -> Option<Self> {
        match raw {
            "id" | "user_id" => Some(UserSort::Id),
            "name" => Some(UserSort::Name),
            "email" => Some(UserSort::Email),
            "role" => Some(UserSort::Role),
            "created_at" => Some(UserSort::CreatedAt),
            _ => None,
        }
    }

    fn as_sql(&self) -> &'static str {
        match self {
            UserSort::Id => "id",
            UserSort::Name => "name",
            UserSort::Email => "email",
            UserSort::Role => "role",
            UserSort::CreatedAt => "created_at",
        }
    }
}

/// Resolve raw `sortBy` / `order` query values. Absent or blank values fall back to defaults.
pub fn resolve_sort<K: SortKey>(
    sort_by: Option<&str>,
    order: Option<&str>,
) -> AppResult<(K, SortOrder)> {
    let mut errors = Vec::new();

    let key = match sort_by.map(str::trim).filter(|s| !s.is_empty()) {
        None => K::DEFAULT,
        Some(raw) => K::from_param(raw).unwrap_or_else(|| {
            errors.push(FieldError::new(
                "sortBy",
                format!("sortBy must be one of: {}", K::ALLOWED.join(", ")),
            ));
            K::DEFAULT
        }),
    };

    let direction = match order.map(str::trim).filter(|s| !s.is_empty()) {
        None => SortOrder::Asc,
        Some(raw) => SortOrder::from_param(raw).unwrap_or_else(|| {
            errors.push(FieldError::new("order", "order must be asc or desc"));
            SortOrder::Asc
        }),
    };

    if errors.is_empty() {
        Ok((key, direction))
    } else {
        Err(AppError::Validation(errors))
    }
}

/// `ORDER BY` clause for a resolved key. Nulls always sort last, ties break on `tiebreak`.
pub fn order_by_clause<K: SortKey>(key: K, order: SortOrder, tiebreak: &str) -> String {
    format!(
        " ORDER BY {} {} NULLS LAST, {} ASC",
        key.as_sql(),
        order.as_sql(),
        tiebreak
    )
}

/// Non-blank search term, trimmed.
pub fn search_term(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

/// Case-insensitive substring pattern with LIKE wildcards escaped.
pub fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

pub fn parse_id(raw: &str, field: &str, message: &str) -> AppResult<i32> {
    raw.trim()
        .parse::<i32>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| AppError::Validation(vec![FieldError::new(field, message)]))
}
