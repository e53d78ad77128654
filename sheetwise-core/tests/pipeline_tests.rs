use serde_json::{Value, json};
use sheetwise_core::compress::{
    StructuralAnchorExtractor, TableRegionDetector, merge_address_ranges,
};
use sheetwise_core::{
    CellValue, CompressionConfig, Grid, LlmProvider, SheetCompressor, SpreadsheetLlm,
};

// Headers, two data rows, a blank row, one more data row
fn sample_grid() -> Grid {
    Grid::from_rows(vec![
        vec![
            CellValue::from("Header1"),
            CellValue::from("Header2"),
            CellValue::from("Header3"),
            CellValue::from("Header4"),
        ],
        vec![
            CellValue::from("Data1"),
            CellValue::from(100i64),
            CellValue::from(200i64),
            CellValue::from(300i64),
        ],
        vec![
            CellValue::from("Data2"),
            CellValue::from(150i64),
            CellValue::from(250i64),
            CellValue::from(350i64),
        ],
        vec![CellValue::Empty; 4],
        vec![
            CellValue::from("Data3"),
            CellValue::from(400i64),
            CellValue::from(500i64),
            CellValue::from(600i64),
        ],
    ])
    .unwrap()
}

// Quarterly report padded out with blank space and a long repetitive body
fn financial_grid() -> Grid {
    let mut rows = vec![vec![CellValue::Empty; 20]; 60];
    rows[0][0] = CellValue::from("Quarterly Report");
    for (c, header) in ["Date", "Region", "Revenue", "Margin"].iter().enumerate() {
        rows[2][c] = CellValue::from(*header);
    }
    for c in 4..19 {
        rows[2][c] = CellValue::from(format!("W{}", c - 3));
    }
    for r in 3..50 {
        rows[r][0] = CellValue::from(format!("2024-01-{:02}", (r % 28) + 1));
        rows[r][1] = CellValue::from(if r % 2 == 0 { "North" } else { "South" });
        rows[r][2] = CellValue::from("$1,000");
        rows[r][3] = CellValue::from("12%");
        for c in 4..19 {
            rows[r][c] = CellValue::from((r * 3 + c) as i64);
        }
    }
    rows[55][10] = CellValue::from("Prepared by finance");
    Grid::from_rows(rows).unwrap()
}

#[test]
fn test_vanilla_sample_addresses() {
    let encoded = SpreadsheetLlm::new().encode_vanilla(&sample_grid()).unwrap();
    assert!(encoded.contains("A1,Header1"));
    assert!(encoded.contains("B2,100"));
    assert!(encoded.contains("A4, |B4, |C4, |D4, "));
}

#[test]
fn test_json_sample_dimensions_and_order() {
    let encoded = SpreadsheetLlm::new().encode_json(&sample_grid()).unwrap();
    let parsed: Value = serde_json::from_str(&encoded).unwrap();

    assert_eq!(parsed["dimensions"], json!({"rows": 5, "columns": 4}));
    assert_eq!(parsed["columns"], json!(["A", "B", "C", "D"]));
    assert_eq!(
        parsed["data"],
        json!([
            ["Header1", "Header2", "Header3", "Header4"],
            ["Data1", 100, 200, 300],
            ["Data2", 150, 250, 350],
            ["", "", "", ""],
            ["Data3", 400, 500, 600],
        ])
    );
}

#[test]
fn test_encoding_stats() {
    let grid = sample_grid();
    let stats = SpreadsheetLlm::new().encoding_stats(&grid).unwrap();

    assert_eq!(stats.original_shape, grid.shape());
    assert!(stats.compression_ratio >= 1.0);
    assert!((0.0..=100.0).contains(&stats.sparsity_percentage));
    assert_eq!(stats.non_empty_cells, 16);
    assert_eq!(stats.vanilla_tokens_estimate, 20);
    assert!(stats.compressed_tokens_estimate > 0);
}

#[test]
fn test_compression_ratio_is_at_least_one() {
    let unique = Grid::from_rows(
        (0..6)
            .map(|r| (0..5).map(|c| CellValue::from(format!("v{r}x{c}"))).collect())
            .collect::<Vec<Vec<CellValue>>>(),
    )
    .unwrap();
    let single = Grid::from_rows(vec![vec![CellValue::from("only")]]).unwrap();

    let sllm = SpreadsheetLlm::new();
    for grid in [sample_grid(), financial_grid(), unique, single] {
        let result = sllm.compress_spreadsheet(&grid).unwrap();
        assert!(
            result.stats.compression_ratio >= 1.0,
            "ratio {} for shape {:?}",
            result.stats.compression_ratio,
            grid.shape()
        );
        assert!(result.stats.representation_size <= result.stats.original_cells);
    }
}

#[test]
fn test_financial_sheet_compresses() {
    let grid = financial_grid();
    let result = SpreadsheetLlm::new().compress_spreadsheet(&grid).unwrap();

    assert_eq!(result.regions.len(), 3);
    // weekly columns J:N are dropped on sheet rows 9 to 45
    assert_eq!(result.stats.pruned_cells, 37 * 5);
    assert!(result.stats.compression_ratio > 1.0);
    assert!(result.compressed_shape.0 < grid.rows());
    let header: Vec<String> = result.value_groups["W8"]
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(header, vec!["L3"]);
    let revenue: Vec<String> = result.value_groups["$1,000"]
        .iter()
        .map(ToString::to_string)
        .collect();
    assert!(revenue.iter().all(|r| r.starts_with('C')));
    assert!(revenue.iter().any(|r| r.contains(':')));

    let encoded = SpreadsheetLlm::new()
        .compress_and_encode_for_llm(&grid)
        .unwrap();
    assert!(encoded.contains("Spreadsheet Data (Compressed"));
}

#[test]
fn test_provider_formats() {
    let sllm = SpreadsheetLlm::new();
    let compressed = sllm.compress_spreadsheet(&financial_grid()).unwrap();
    let render = |provider| sllm.encode_for_llm_provider(&compressed, provider).unwrap();

    assert!(render(LlmProvider::ChatGpt).contains("Key-Value Mappings"));
    assert!(render(LlmProvider::Claude).contains("## Summary"));
    assert!(render(LlmProvider::Gemini).contains('|'));
    assert!(render(LlmProvider::General).contains("Spreadsheet Data"));
    assert!(
        sllm.encode_compressed_for_llm(&compressed)
            .unwrap()
            .contains("Spreadsheet Data")
    );
}

#[test]
fn test_compress_with_auto_config() {
    let result = SpreadsheetLlm::new()
        .compress_with_auto_config(&financial_grid())
        .unwrap();
    assert!(!result.is_empty());
    assert!(result.contains("Spreadsheet Data"));
}

#[test]
fn test_smaller_k_never_grows_regions() {
    let grid = financial_grid();
    let extractor = StructuralAnchorExtractor;
    for region in TableRegionDetector::default().detect(&grid) {
        let anchors = extractor.extract_anchors(&grid, &region);
        let mut previous = usize::MAX;
        for k in (1..=6).rev() {
            let pruned = extractor.prune(&region, &anchors, k);
            assert!(pruned.retained_cell_count() <= previous);
            previous = pruned.retained_cell_count();
            for row in &anchors.anchor_rows {
                assert!(pruned.kept_rows.contains(row));
            }
            for col in &anchors.anchor_cols {
                assert!(pruned.kept_cols.contains(col));
            }
        }
    }
}

#[test]
fn test_merged_groups_are_stable() {
    let result = SheetCompressor::new(CompressionConfig::default())
        .unwrap()
        .compress(&financial_grid());

    for ranges in result.value_groups.values() {
        let cells = ranges.iter().flat_map(|r| r.expand());
        assert_eq!(&merge_address_ranges(cells, 2), ranges);
    }
    for ranges in result.format_groups.values() {
        let cells = ranges.iter().flat_map(|r| r.expand());
        assert_eq!(&merge_address_ranges(cells, 3), ranges);
    }
}

#[test]
fn test_compressed_representation_serializes() {
    let result = SpreadsheetLlm::new()
        .compress_spreadsheet(&sample_grid())
        .unwrap();
    let value = serde_json::to_value(&result).unwrap();

    assert_eq!(value["original_shape"], json!([5, 4]));
    assert_eq!(value["value_groups"]["Header1"], json!([{"type": "single", "address": "A1"}]));
    assert!(value["stats"]["compression_ratio"].as_f64().unwrap() >= 1.0);
}
