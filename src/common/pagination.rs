// src/common/pagination.rs

pub const DEFAULT_LIMIT: i64 = 50;
pub const MAX_LIMIT: i64 = 100;

/// Limite de página: padrão 50, sempre entre 1 e 100.
pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.map_or(DEFAULT_LIMIT, |l| l.clamp(1, MAX_LIMIT))
}

pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}

// Paginação por número de página (usada em gastos).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: i64,
    pub limit: i64,
}

impl Page {
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: clamp_limit(limit),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_defaults_and_clamps() {
        assert_eq!(clamp_limit(None), 50);
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(-5)), 1);
        assert_eq!(clamp_limit(Some(20)), 20);
        assert_eq!(clamp_limit(Some(1000)), 100);
    }

    #[test]
    fn negative_offset_becomes_zero() {
        assert_eq!(clamp_offset(None), 0);
        assert_eq!(clamp_offset(Some(-3)), 0);
        assert_eq!(clamp_offset(Some(40)), 40);
    }

    #[test]
    fn page_offset_follows_page_number() {
        let page = Page::new(Some(3), Some(20));
        assert_eq!(page.offset(), 40);

        let first = Page::new(Some(0), None);
        assert_eq!(first, Page { page: 1, limit: 50 });
        assert_eq!(first.offset(), 0);

        let huge = Page::new(Some(i64::MAX), Some(50));
        assert_eq!(huge.offset(), i64::MAX);
    }
}
