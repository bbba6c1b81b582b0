// src/genus_preview.rs

use crate::types::{AnnotationKind, TaxonRow};

/// Preview counts shown next to a genus row's name: how many of its
/// species carry each pathogen tag and each curator annotation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenusPreview {
    /// (tag, count) pairs with count > 0, sorted by tag for stable display.
    pub pathogen_counts: Vec<(String, u32)>,
    /// (kind, count) pairs with count > 0, in hit / not_a_hit /
    /// inconclusive order.
    pub annotation_counts: Vec<(AnnotationKind, u32)>,
}

impl GenusPreview {
    /// Whether the pathogen section of the preview renders at all.
    pub fn has_pathogens(&self) -> bool {
        !self.pathogen_counts.is_empty()
    }

    /// Whether the annotation section of the preview renders at all.
    pub fn has_annotations(&self) -> bool {
        !self.annotation_counts.is_empty()
    }

    /// Whether anything renders; drives the leading separator in the UI.
    pub fn has_content(&self) -> bool {
        self.has_pathogens() || self.has_annotations()
    }
}

/// Compute the genus-row preview from the row's nested count maps.
/// Empty maps are simply empty sections; zero counts never render.
pub fn aggregate_genus_preview(row: &TaxonRow) -> GenusPreview {
    let mut pathogen_counts: Vec<(String, u32)> = row
        .pathogens
        .iter()
        .filter(|(_, &count)| count > 0)
        .map(|(tag, &count)| (tag.clone(), count))
        .collect();
    pathogen_counts.sort_unstable_by(|a, b| a.0.cmp(&b.0));

    let annotation_counts = AnnotationKind::ALL
        .iter()
        .filter_map(|&kind| {
            let count = row.species_annotations.get(&kind).copied().unwrap_or(0);
            (count > 0).then_some((kind, count))
        })
        .collect();

    GenusPreview {
        pathogen_counts,
        annotation_counts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TaxLevel;

    fn genus_row() -> TaxonRow {
        TaxonRow::new(561, 543, "Escherichia", TaxLevel::Genus)
    }

    #[test]
    fn absent_maps_render_nothing() {
        let preview = aggregate_genus_preview(&genus_row());
        assert!(!preview.has_pathogens());
        assert!(!preview.has_annotations());
        assert!(!preview.has_content());
    }

    #[test]
    fn zero_counts_are_dropped() {
        let mut row = genus_row();
        row.pathogens.insert("knownPathogen".to_string(), 0);
        row.species_annotations.insert(AnnotationKind::Hit, 0);

        let preview = aggregate_genus_preview(&row);
        assert!(!preview.has_content());
    }

    #[test]
    fn nonzero_counts_render_sorted() {
        let mut row = genus_row();
        row.pathogens.insert("lcrp".to_string(), 1);
        row.pathogens.insert("knownPathogen".to_string(), 3);
        row.species_annotations.insert(AnnotationKind::NotAHit, 2);
        row.species_annotations.insert(AnnotationKind::Hit, 1);

        let preview = aggregate_genus_preview(&row);
        assert_eq!(
            preview.pathogen_counts,
            vec![
                ("knownPathogen".to_string(), 3),
                ("lcrp".to_string(), 1)
            ]
        );
        assert_eq!(
            preview.annotation_counts,
            vec![(AnnotationKind::Hit, 1), (AnnotationKind::NotAHit, 2)]
        );
        assert!(preview.has_content());
    }
}
