//! Inverted-index translation: value -> merged address ranges

use super::anchors::PrunedRegion;
use super::classifier::DataType;
use super::ranges::{AddressRange, TRANSLATION_MIN_RUN, merge_address_ranges};
use crate::grid::{Cell, CellRef, Grid};
use std::collections::BTreeMap;

/// Value to the ranges holding it. Empty cells are never listed.
pub type InvertedIndex = BTreeMap<String, Vec<AddressRange>>;

#[derive(Debug, Clone, Copy)]
pub struct InvertedIndexTranslator {
    min_run: usize,
}

impl Default for InvertedIndexTranslator {
    fn default() -> Self {
        Self {
            min_run: TRANSLATION_MIN_RUN,
        }
    }
}

impl InvertedIndexTranslator {
    pub fn new(min_run: usize) -> Self {
        Self { min_run }
    }

    /// Group the retained non-empty cells by normalized value
    pub fn translate(&self, grid: &Grid, pruned: &PrunedRegion) -> InvertedIndex {
        self.translate_cells(pruned.cells(grid))
    }

    pub fn translate_cells<'a, I>(&self, cells: I) -> InvertedIndex
    where
        I: IntoIterator<Item = &'a Cell>,
    {
        let mut groups: BTreeMap<String, Vec<CellRef>> = BTreeMap::new();
        for cell in cells.into_iter().filter(|c| !c.is_empty()) {
            groups
                .entry(normalize_value(cell))
                .or_default()
                .push(cell.at);
        }

        groups
            .into_iter()
            .map(|(value, refs)| (value, merge_address_ranges(refs, self.min_run)))
            .collect()
    }

    /// Merge bare `A1` addresses. Unparseable entries are passed through untouched.
    pub fn translate_addresses<S: AsRef<str>>(&self, addresses: &[S]) -> Vec<String> {
        let mut refs = Vec::with_capacity(addresses.len());
        let mut passthrough = Vec::new();
        for address in addresses {
            match CellRef::parse(address.as_ref()) {
                Some(at) => refs.push(at),
                None => passthrough.push(address.as_ref().to_string()),
            }
        }

        merge_address_ranges(refs, self.min_run)
            .iter()
            .map(ToString::to_string)
            .chain(passthrough)
            .collect()
    }
}

/// Trim text; numbers lose thousands separators and trailing fractional zeros
pub fn normalize_value(cell: &Cell) -> String {
    let text = cell.value.as_text();
    let text = text.trim();
    match cell.data_type {
        DataType::Integer => text.replace(',', "").trim_start_matches('+').to_string(),
        DataType::Float => {
            let plain = text.replace(',', "");
            let plain = plain.trim_start_matches('+');
            match plain.trim_end_matches('0').trim_end_matches('.') {
                "" | "-" => "0".to_string(),
                trimmed => trimmed.to_string(),
            }
        }
        _ => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compress::detector::TableRegion;
    use crate::grid::CellValue;

    fn render(index: &InvertedIndex, value: &str) -> Vec<String> {
        index[value].iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_merge_contiguous_addresses() {
        let translator = InvertedIndexTranslator::default();
        let merged = translator.translate_addresses(&["A1", "A2", "A3", "A4", "A5"]);
        assert!(merged.iter().any(|a| a.contains(':')));
        assert_eq!(merged, vec!["A1:A5"]);
    }

    #[test]
    fn test_malformed_addresses_pass_through() {
        let translator = InvertedIndexTranslator::default();
        let merged = translator.translate_addresses(&["B1", "B2", "not-a-cell"]);
        assert_eq!(merged, vec!["B1:B2", "not-a-cell"]);
    }

    #[test]
    fn test_translate_groups_identical_values() {
        let grid = Grid::from_rows(vec![
            vec![CellValue::from("Status"), CellValue::from("Amount")],
            vec![CellValue::from("open"), CellValue::from("1,000")],
            vec![CellValue::from("open"), CellValue::from(1000i64)],
            vec![CellValue::from("open"), CellValue::from("")],
            vec![CellValue::from("closed"), CellValue::from("2.50")],
        ])
        .unwrap();
        let pruned = PrunedRegion::full(TableRegion::whole(&grid));
        let index = InvertedIndexTranslator::default().translate(&grid, &pruned);

        assert_eq!(render(&index, "open"), vec!["A2:A4"]);
        assert_eq!(render(&index, "1000"), vec!["B2:B3"]);
        assert_eq!(render(&index, "2.5"), vec!["B5"]);
        assert!(!index.contains_key(""));
        assert_eq!(index.len(), 6);
    }

    #[test]
    fn test_normalize_numbers() {
        let float = Cell::new(0, 0, CellValue::from("1,000.50"));
        assert_eq!(normalize_value(&float), "1000.5");
        let whole = Cell::new(0, 0, CellValue::from("7.0"));
        assert_eq!(normalize_value(&whole), "7");
        let text = Cell::new(0, 0, CellValue::from("  padded "));
        assert_eq!(normalize_value(&text), "padded");
    }

    #[test]
    fn test_translation_is_idempotent() {
        let grid = Grid::from_rows(vec![
            vec![CellValue::from("x"), CellValue::from("x"), CellValue::from("x")],
            vec![CellValue::from("x"), CellValue::from("y"), CellValue::from("x")],
        ])
        .unwrap();
        let translator = InvertedIndexTranslator::default();
        let pruned = PrunedRegion::full(TableRegion::whole(&grid));
        let index = translator.translate(&grid, &pruned);

        for ranges in index.values() {
            let expanded: Vec<CellRef> = ranges.iter().flat_map(AddressRange::expand).collect();
            assert_eq!(&merge_address_ranges(expanded, TRANSLATION_MIN_RUN), ranges);
        }
    }
}
