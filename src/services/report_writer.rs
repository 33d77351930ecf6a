//! Excel 报表导出 - 业务能力层
//!
//! 每个分组一行：第一列是分组标签，后面每列嵌入一张缩略图。
//! 图片列的顺序为"第二张、第一张(贴纸)、第三张"，贴纸图片在成对模式下位于最右侧。

use std::path::PathBuf;

use rust_xlsxwriter::{Format, Image, Workbook, Worksheet};
use tokio::fs;
use tracing::{info, warn};

use crate::error::{AppResult, LabelerError};
use crate::models::{GroupSize, ImageRecord};
use crate::services::naming;

const SHEET_NAME: &str = "Photo Labels";
const LABEL_COLUMN_WIDTH: f64 = 30.0;
const IMAGE_COLUMN_WIDTHS: [f64; 3] = [40.0, 40.0, 35.0];
const ROW_HEIGHT: f64 = 80.0;
const THUMBNAIL_WIDTH: f64 = 120.0;
const THUMBNAIL_HEIGHT: f64 = 90.0;
const THUMBNAIL_OFFSET: u32 = 5;

/// 报表中的一行
#[derive(Debug)]
pub struct ReportRow<'a> {
    /// 分组标签（第一张的名称或 `N/A`）
    pub label: String,
    /// 按列顺序排列的图片，组内缺少的位置为 `None`
    pub images: Vec<Option<&'a ImageRecord>>,
}

/// 报表导出结果
#[derive(Debug)]
pub struct ReportOutput {
    pub bytes: Vec<u8>,
    pub rows: usize,
    pub embedded: usize,
    /// 嵌入失败的图片（不影响其余导出）
    pub failures: Vec<LabelerError>,
}

/// 组内位置 → 列顺序
pub fn image_slot_order(group_size: GroupSize) -> &'static [usize] {
    match group_size {
        GroupSize::Pair => &[1, 0],
        GroupSize::Triplet => &[1, 0, 2],
    }
}

/// 表头
pub fn report_headers(group_size: GroupSize) -> Vec<String> {
    let mut headers = vec![
        format!("New Label ({})", group_size.name()),
        "Image 2 (Associated)".to_string(),
        "Image 1 (Sticker)".to_string(),
    ];
    if group_size == GroupSize::Triplet {
        headers.push("Image 3".to_string());
    }
    headers
}

/// 按分组计算报表的行（不看状态）
pub fn build_report_rows(records: &[ImageRecord], group_size: GroupSize) -> Vec<ReportRow<'_>> {
    records
        .chunks(group_size.get())
        .map(|group| {
            let label = group
                .first()
                .map(|head| head.derived_name.as_str())
                .filter(|name| !name.is_empty())
                .unwrap_or(naming::PLACEHOLDER_LABEL)
                .to_string();

            let images = image_slot_order(group_size)
                .iter()
                .map(|&slot| group.get(slot))
                .collect();

            ReportRow { label, images }
        })
        .collect()
}

/// 在内存中生成报表
pub fn build_report(records: &[ImageRecord], group_size: GroupSize) -> AppResult<ReportOutput> {
    let rows = build_report_rows(records, group_size);

    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, header) in report_headers(group_size).iter().enumerate() {
        let col = col as u16;
        let width = if col == 0 {
            LABEL_COLUMN_WIDTH
        } else {
            IMAGE_COLUMN_WIDTHS[(col - 1) as usize]
        };
        worksheet.set_column_width(col, width)?;
        worksheet.write_string_with_format(0, col, header, &header_format)?;
    }

    let mut embedded = 0;
    let mut failures = Vec::new();

    for (index, row) in rows.iter().enumerate() {
        let row_num = (index + 1) as u32;
        worksheet.write_string(row_num, 0, &row.label)?;
        worksheet.set_row_height(row_num, ROW_HEIGHT)?;

        for (offset, image) in row.images.iter().enumerate() {
            let Some(record) = image else { continue };
            let col = (offset + 1) as u16;
            match embed_thumbnail(worksheet, row_num, col, record) {
                Ok(()) => embedded += 1,
                Err(e) => {
                    warn!("⚠️ {}", e);
                    failures.push(e);
                }
            }
        }
    }

    let bytes = workbook.save_to_buffer()?;

    Ok(ReportOutput {
        bytes,
        rows: rows.len(),
        embedded,
        failures,
    })
}

/// 把一张图片以固定尺寸嵌入单元格
fn embed_thumbnail(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    record: &ImageRecord,
) -> AppResult<()> {
    let failed = |message: &dyn std::fmt::Display| {
        LabelerError::thumbnail_embed_failed(&record.original_name, message)
    };

    let image = Image::new_from_buffer(&record.file.bytes).map_err(|e| failed(&e))?;
    if image.width() <= 0.0 || image.height() <= 0.0 {
        return Err(failed(&"图片尺寸无效"));
    }

    // 按像素尺寸缩放，已考虑图片自带的 DPI
    let image = image.set_scale_to_size(THUMBNAIL_WIDTH, THUMBNAIL_HEIGHT, false);

    worksheet
        .insert_image_with_offset(row, col, &image, THUMBNAIL_OFFSET, THUMBNAIL_OFFSET)
        .map_err(|e| failed(&e))?;
    Ok(())
}

/// Excel 报表导出服务
pub struct ReportWriter {
    output_folder: PathBuf,
    group_size: GroupSize,
}

impl ReportWriter {
    pub fn new(output_folder: impl Into<PathBuf>, group_size: GroupSize) -> Self {
        Self {
            output_folder: output_folder.into(),
            group_size,
        }
    }

    /// 生成并写入 `<output_folder>/<base>-report.xlsx`
    pub async fn write(
        &self,
        records: &[ImageRecord],
        base_name: &str,
    ) -> AppResult<(PathBuf, ReportOutput)> {
        let output = build_report(records, self.group_size)?;
        let path = self.output_folder.join(naming::report_file_name(base_name));

        fs::create_dir_all(&self.output_folder).await?;
        fs::write(&path, &output.bytes).await?;

        info!(
            "📊 Excel 报表已导出: {} ({} 行, {} 张缩略图, {} 张失败)",
            path.display(),
            output.rows,
            output.embedded,
            output.failures.len()
        );
        Ok((path, output))
    }
}
