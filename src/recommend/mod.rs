//! Remediation recommendations derived from an optimization result.
//!
//! A pure, deterministic mapping from weak-area count and analysis
//! confidence to prioritized remediation categories, consulting an
//! externally supplied product catalog for category-to-product lookup
//! only. No catalog state is retained between calls.

use std::collections::BTreeMap;

use crate::domain::CalibrationPoint;
use crate::placement::OptimizationResult;

/// Confidence below which a survey is too uncertain for a single-accessory
/// fix and a multi-unit solution is suggested instead.
pub const LOW_CONFIDENCE_THRESHOLD: f64 = 0.3;

/// Remediation categories. A closed set matched exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RemediationCategory {
    /// A single range-extending accessory near the weak spot.
    RangeExtender,
    /// A mesh or multi-unit system covering several weak regions.
    MeshSystem,
}

impl RemediationCategory {
    /// Human-readable label.
    pub const fn label(&self) -> &'static str {
        match self {
            RemediationCategory::RangeExtender => "Range extender",
            RemediationCategory::MeshSystem => "Mesh system",
        }
    }
}

/// How urgent a recommendation is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Severity {
    /// Coverage is workable; the suggestion is an improvement.
    Advisory,
    /// Coverage has substantial gaps or the survey is too uncertain.
    Critical,
}

/// A product reference resolved from the catalog. Held by value; no
/// back-reference into the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProductRef {
    /// Catalog identifier.
    pub id: String,
    /// Display name.
    pub name: String,
}

impl ProductRef {
    /// Create a product reference.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Externally supplied category-to-product catalog.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: BTreeMap<RemediationCategory, Vec<ProductRef>>,
}

impl Catalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a product under a category.
    pub fn add_product(&mut self, category: RemediationCategory, product: ProductRef) {
        self.products.entry(category).or_default().push(product);
    }

    /// Builder-style variant of [`add_product`](Self::add_product).
    pub fn with_product(
        mut self,
        category: RemediationCategory,
        product: ProductRef,
    ) -> Self {
        self.add_product(category, product);
        self
    }

    /// Products registered under a category.
    pub fn products_for(&self, category: RemediationCategory) -> &[ProductRef] {
        self.products.get(&category).map_or(&[], Vec::as_slice)
    }
}

/// One prioritized remediation suggestion.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Recommendation {
    /// What kind of remediation.
    pub category: RemediationCategory,
    /// How urgent it is.
    pub severity: Severity,
    /// Matching products, copied out of the catalog.
    pub products: Vec<ProductRef>,
}

/// The prioritized set of remediation suggestions for one analysis.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RecommendationSet {
    /// Suggestions in priority order.
    pub categories: Vec<Recommendation>,
}

impl RecommendationSet {
    /// Whether no remediation is suggested.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Number of suggestions.
    pub fn len(&self) -> usize {
        self.categories.len()
    }
}

/// Map weak areas and analysis confidence to remediation suggestions.
///
/// No weak areas mean coverage is fine and nothing is suggested, however
/// uncertain the survey. One or two weak areas suggest a single range
/// extender; three or more, or a low-confidence survey, suggest a mesh
/// system.
pub fn recommend(
    weak_areas: &[CalibrationPoint],
    confidence_score: f64,
    catalog: &Catalog,
) -> RecommendationSet {
    let mut categories = Vec::new();

    if !weak_areas.is_empty() {
        let (category, severity) =
            if weak_areas.len() >= 3 || confidence_score < LOW_CONFIDENCE_THRESHOLD {
                (RemediationCategory::MeshSystem, Severity::Critical)
            } else {
                (RemediationCategory::RangeExtender, Severity::Advisory)
            };
        categories.push(Recommendation {
            category,
            severity,
            products: catalog.products_for(category).to_vec(),
        });
    }

    RecommendationSet { categories }
}

/// Convenience wrapper taking a whole optimization result.
pub fn recommend_for_result(
    result: &OptimizationResult,
    catalog: &Catalog,
) -> RecommendationSet {
    recommend(&result.weak_areas, result.confidence_score, catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{SignalReading, Vector3};

    fn weak_point(label: &str) -> CalibrationPoint {
        CalibrationPoint::new(
            label.to_string(),
            None,
            1,
            SignalReading::new(0.2, 1.0),
            Vector3::default(),
        )
    }

    fn catalog() -> Catalog {
        Catalog::new()
            .with_product(
                RemediationCategory::RangeExtender,
                ProductRef::new("ext-1", "Plug-in Extender"),
            )
            .with_product(
                RemediationCategory::MeshSystem,
                ProductRef::new("mesh-1", "Tri-band Mesh Kit"),
            )
    }

    #[test]
    fn test_no_weak_areas_is_empty() {
        let set = recommend(&[], 0.9, &catalog());
        assert!(set.is_empty());
    }

    #[test]
    fn test_no_weak_areas_stays_empty_even_at_low_confidence() {
        let set = recommend(&[], 0.1, &catalog());
        assert!(set.is_empty());
    }

    #[test]
    fn test_few_weak_areas_suggest_range_extender() {
        let weak = vec![weak_point("Bedroom"), weak_point("Kitchen")];
        let set = recommend(&weak, 0.8, &catalog());

        assert_eq!(set.len(), 1);
        let rec = &set.categories[0];
        assert_eq!(rec.category, RemediationCategory::RangeExtender);
        assert_eq!(rec.severity, Severity::Advisory);
        assert_eq!(rec.products[0].id, "ext-1");
    }

    #[test]
    fn test_many_weak_areas_suggest_mesh() {
        let weak = vec![
            weak_point("Bedroom"),
            weak_point("Kitchen"),
            weak_point("Garage"),
        ];
        let set = recommend(&weak, 0.8, &catalog());

        let rec = &set.categories[0];
        assert_eq!(rec.category, RemediationCategory::MeshSystem);
        assert_eq!(rec.severity, Severity::Critical);
    }

    #[test]
    fn test_low_confidence_escalates_to_mesh() {
        let weak = vec![weak_point("Bedroom")];
        let set = recommend(&weak, 0.2, &catalog());
        assert_eq!(set.categories[0].category, RemediationCategory::MeshSystem);
    }

    #[test]
    fn test_missing_catalog_entry_yields_empty_products() {
        let weak = vec![weak_point("Bedroom")];
        let set = recommend(&weak, 0.8, &Catalog::new());
        assert_eq!(set.categories[0].category, RemediationCategory::RangeExtender);
        assert!(set.categories[0].products.is_empty());
    }

    #[test]
    fn test_engine_is_pure_and_deterministic() {
        let weak = vec![weak_point("Bedroom")];
        let catalog = catalog();
        let first = recommend(&weak, 0.8, &catalog);
        let second = recommend(&weak, 0.8, &catalog);
        assert_eq!(first, second);
    }
}
