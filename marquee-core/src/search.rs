//! Search result rows combining fan uploads with catalog hits

use marquee_model::{CatalogMovie, UserMovie};

/// One row of a combined search listing.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchRow {
    Upload(UserMovie),
    Catalog(CatalogMovie),
}

impl SearchRow {
    pub fn title(&self) -> &str {
        match self {
            Self::Upload(movie) => &movie.title,
            Self::Catalog(movie) => &movie.title,
        }
    }

    pub fn is_upload(&self) -> bool {
        matches!(self, Self::Upload(_))
    }
}

/// Uploads first, then catalog results, each in their given order.
pub fn merge_results(
    uploads: Vec<UserMovie>,
    catalog: Vec<CatalogMovie>,
) -> Vec<SearchRow> {
    uploads
        .into_iter()
        .map(SearchRow::Upload)
        .chain(catalog.into_iter().map(SearchRow::Catalog))
        .collect()
}

/// Case-insensitive title filter. A blank term keeps every row.
pub fn filter_by_title(term: &str, rows: Vec<SearchRow>) -> Vec<SearchRow> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return rows;
    }
    rows.into_iter()
        .filter(|row| row.title().to_lowercase().contains(&needle))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use marquee_model::NewUserMovie;

    fn catalog(id: u64, title: &str) -> CatalogMovie {
        CatalogMovie {
            id,
            title: title.into(),
            overview: String::new(),
            poster_path: None,
            backdrop_path: None,
            vote_average: 0.0,
            release_date: None,
        }
    }

    #[test]
    fn uploads_lead_the_listing() {
        let upload = NewUserMovie::new("Local Hero", "").into_user_movie(
            "1-a".into(),
            "u".into(),
            1,
        );
        let rows = merge_results(
            vec![upload],
            vec![catalog(9, "Hero"), catalog(10, "Other")],
        );

        assert!(rows[0].is_upload());
        assert_eq!(
            rows.iter().map(SearchRow::title).collect::<Vec<_>>(),
            ["Local Hero", "Hero", "Other"]
        );

        let filtered = filter_by_title(" HERO", rows);
        assert_eq!(filtered.len(), 2);
        assert_eq!(filter_by_title("", filtered).len(), 2);
    }
}
