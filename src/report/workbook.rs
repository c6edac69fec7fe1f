//! Report Workbook Module
//! Generates the two-sheet xlsx report with the chart image embedded.
//!
//! Uses direct ZIP/XML generation: a SpreadsheetML package is small enough
//! that writing the parts by hand beats pulling in a workbook library.

use crate::charts::ChartImage;
use polars::prelude::*;
use std::io::{Cursor, Write};
use thiserror::Error;
use ::zip::write::FileOptions;
use ::zip::ZipWriter;

/// Sheet holding the (filtered) table rows.
pub const DATA_SHEET: &str = "Analyzed Data";
/// Sheet holding the embedded chart image.
pub const CHART_SHEET: &str = "Charts";

/// EMU (English Metric Units) conversion: 9525 EMU = 1 pixel at 96 DPI
const EMU_PER_PIXEL: u32 = 9525;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Workbook serialization failed: {0}")]
    Zip(#[from] ::zip::result::ZipError),
    #[error("Workbook serialization failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Workbook serialization failed: {0}")]
    Table(#[from] PolarsError),
}

/// Writes the report workbook: table on sheet one, chart image on sheet two.
pub struct WorkbookBuilder;

impl WorkbookBuilder {
    /// Serialize the table and chart into an in-memory xlsx byte buffer.
    ///
    /// Sheet layout: header row then one row per table row, no index column.
    /// The image sits at a fixed A1 anchor at its native pixel size.
    pub fn build(df: &DataFrame, chart: &ChartImage) -> Result<Vec<u8>, ReportError> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default();

        zip.start_file("[Content_Types].xml", options)?;
        zip.write_all(Self::content_types_xml().as_bytes())?;

        zip.start_file("_rels/.rels", options)?;
        zip.write_all(Self::rels_xml().as_bytes())?;

        zip.start_file("xl/workbook.xml", options)?;
        zip.write_all(Self::workbook_xml().as_bytes())?;

        zip.start_file("xl/_rels/workbook.xml.rels", options)?;
        zip.write_all(Self::workbook_rels_xml().as_bytes())?;

        zip.start_file("xl/styles.xml", options)?;
        zip.write_all(Self::styles_xml().as_bytes())?;

        zip.start_file("xl/worksheets/sheet1.xml", options)?;
        zip.write_all(Self::data_sheet_xml(df)?.as_bytes())?;

        zip.start_file("xl/worksheets/sheet2.xml", options)?;
        zip.write_all(Self::chart_sheet_xml().as_bytes())?;

        zip.start_file("xl/worksheets/_rels/sheet2.xml.rels", options)?;
        zip.write_all(Self::chart_sheet_rels_xml().as_bytes())?;

        zip.start_file("xl/drawings/drawing1.xml", options)?;
        zip.write_all(Self::drawing_xml(chart.width, chart.height).as_bytes())?;

        zip.start_file("xl/drawings/_rels/drawing1.xml.rels", options)?;
        zip.write_all(Self::drawing_rels_xml().as_bytes())?;

        zip.start_file("xl/media/image1.png", options)?;
        zip.write_all(&chart.png)?;

        zip.start_file("docProps/core.xml", options)?;
        zip.write_all(Self::core_props_xml().as_bytes())?;

        zip.start_file("docProps/app.xml", options)?;
        zip.write_all(Self::app_props_xml().as_bytes())?;

        let cursor = zip.finish()?;
        Ok(cursor.into_inner())
    }

    /// Render the data sheet: header row first, then table rows in order.
    fn data_sheet_xml(df: &DataFrame) -> Result<String, ReportError> {
        let columns = df.get_columns();

        let mut rows = String::new();
        rows.push_str("<row r=\"1\">");
        for (c, column) in columns.iter().enumerate() {
            rows.push_str(&Self::inline_string_cell(
                &Self::cell_ref(c, 0),
                column.name().as_str(),
            ));
        }
        rows.push_str("</row>");

        for r in 0..df.height() {
            rows.push_str(&format!("<row r=\"{}\">", r + 2));
            for (c, column) in columns.iter().enumerate() {
                let value = column.get(r)?;
                rows.push_str(&Self::value_cell(&Self::cell_ref(c, r + 1), &value));
            }
            rows.push_str("</row>");
        }

        Ok(format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{rows}</sheetData></worksheet>"#
        ))
    }

    fn value_cell(cell_ref: &str, value: &AnyValue) -> String {
        match value {
            AnyValue::Null => format!(r#"<c r="{cell_ref}"/>"#),
            AnyValue::Boolean(b) => {
                format!(r#"<c r="{cell_ref}" t="b"><v>{}</v></c>"#, *b as u8)
            }
            AnyValue::String(s) => Self::inline_string_cell(cell_ref, s),
            AnyValue::StringOwned(s) => Self::inline_string_cell(cell_ref, s.as_str()),
            other => {
                if crate::data::is_numeric_dtype(&other.dtype()) {
                    match other.extract::<f64>() {
                        Some(v) if v.is_finite() => {
                            format!(r#"<c r="{cell_ref}"><v>{v}</v></c>"#)
                        }
                        _ => format!(r#"<c r="{cell_ref}"/>"#),
                    }
                } else {
                    let text = other.to_string();
                    Self::inline_string_cell(cell_ref, text.trim_matches('"'))
                }
            }
        }
    }

    fn inline_string_cell(cell_ref: &str, text: &str) -> String {
        format!(
            r#"<c r="{cell_ref}" t="inlineStr"><is><t xml:space="preserve">{}</t></is></c>"#,
            Self::escape_xml(text)
        )
    }

    /// Column index + row index (0-based) to an A1-style reference.
    fn cell_ref(col: usize, row: usize) -> String {
        let mut letters = String::new();
        let mut n = col + 1;
        while n > 0 {
            let rem = (n - 1) % 26;
            letters.insert(0, (b'A' + rem as u8) as char);
            n = (n - 1) / 26;
        }
        format!("{letters}{}", row + 1)
    }

    fn escape_xml(text: &str) -> String {
        let mut escaped = String::with_capacity(text.len());
        for ch in text.chars() {
            match ch {
                '&' => escaped.push_str("&amp;"),
                '<' => escaped.push_str("&lt;"),
                '>' => escaped.push_str("&gt;"),
                '"' => escaped.push_str("&quot;"),
                '\'' => escaped.push_str("&apos;"),
                _ => escaped.push(ch),
            }
        }
        escaped
    }

    fn content_types_xml() -> &'static str {
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Default Extension="png" ContentType="image/png"/>
<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
<Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
<Override PartName="/xl/worksheets/sheet2.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
<Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>
<Override PartName="/xl/drawings/drawing1.xml" ContentType="application/vnd.openxmlformats-officedocument.drawing+xml"/>
<Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>
<Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>
</Types>"#
    }

    fn rels_xml() -> &'static str {
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>
<Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties" Target="docProps/app.xml"/>
</Relationships>"#
    }

    fn workbook_xml() -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<sheets>
<sheet name="{DATA_SHEET}" sheetId="1" r:id="rId1"/>
<sheet name="{CHART_SHEET}" sheetId="2" r:id="rId2"/>
</sheets>
</workbook>"#
        )
    }

    fn workbook_rels_xml() -> &'static str {
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet2.xml"/>
<Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
</Relationships>"#
    }

    fn styles_xml() -> &'static str {
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<fonts count="1"><font><sz val="11"/><name val="Calibri"/></font></fonts>
<fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills>
<borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders>
<cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>
<cellXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/></cellXfs>
<cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles>
</styleSheet>"#
    }

    fn chart_sheet_xml() -> &'static str {
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<sheetData/>
<drawing r:id="rId1"/>
</worksheet>"#
    }

    fn chart_sheet_rels_xml() -> &'static str {
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/drawing" Target="../drawings/drawing1.xml"/>
</Relationships>"#
    }

    /// One-cell anchor at A1; extent is the image's native pixel size in EMU.
    fn drawing_xml(width_px: u32, height_px: u32) -> String {
        let cx = width_px * EMU_PER_PIXEL;
        let cy = height_px * EMU_PER_PIXEL;
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<xdr:wsDr xmlns:xdr="http://schemas.openxmlformats.org/drawingml/2006/spreadsheetDrawing" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<xdr:oneCellAnchor>
<xdr:from><xdr:col>0</xdr:col><xdr:colOff>0</xdr:colOff><xdr:row>0</xdr:row><xdr:rowOff>0</xdr:rowOff></xdr:from>
<xdr:ext cx="{cx}" cy="{cy}"/>
<xdr:pic>
<xdr:nvPicPr>
<xdr:cNvPr id="2" name="Chart 1"/>
<xdr:cNvPicPr><a:picLocks noChangeAspect="1"/></xdr:cNvPicPr>
</xdr:nvPicPr>
<xdr:blipFill>
<a:blip r:embed="rId1"/>
<a:stretch><a:fillRect/></a:stretch>
</xdr:blipFill>
<xdr:spPr>
<a:xfrm><a:off x="0" y="0"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm>
<a:prstGeom prst="rect"><a:avLst/></a:prstGeom>
</xdr:spPr>
</xdr:pic>
<xdr:clientData/>
</xdr:oneCellAnchor>
</xdr:wsDr>"#
        )
    }

    fn drawing_rels_xml() -> &'static str {
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="../media/image1.png"/>
</Relationships>"#
    }

    fn core_props_xml() -> &'static str {
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
<dc:title>Analysis Report</dc:title>
<dc:creator>Tablewise</dc:creator>
<cp:lastModifiedBy>Tablewise</cp:lastModifiedBy>
<cp:revision>1</cp:revision>
</cp:coreProperties>"#
    }

    fn app_props_xml() -> &'static str {
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes">
<Application>Tablewise</Application>
<DocSecurity>0</DocSecurity>
<ScaleCrop>false</ScaleCrop>
<SharedDoc>false</SharedDoc>
<HyperlinksChanged>false</HyperlinksChanged>
<AppVersion>16.0000</AppVersion>
</Properties>"#
    }
}
