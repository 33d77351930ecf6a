use crate::models::media_type;
use crate::models::record::{ImagePayload, ImageRecord};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

/// 读取单张图片并创建记录
pub async fn load_image(image_path: &Path) -> Result<ImageRecord> {
    let file_name = image_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .with_context(|| format!("无效的图片路径: {}", image_path.display()))?;

    let media_type = media_type::from_file_name(&file_name)
        .with_context(|| format!("不支持的图片类型: {}", file_name))?;

    let bytes = fs::read(image_path)
        .await
        .with_context(|| format!("无法读取图片: {}", image_path.display()))?;

    Ok(ImageRecord::new(
        file_name,
        image_path.to_path_buf(),
        ImagePayload::new(bytes, media_type),
    ))
}

/// 从文件夹中加载所有图片，按文件名排序作为上传顺序
///
/// 非图片文件会被忽略，读取失败的图片只记录警告。
pub async fn load_images_from_folder(folder_path: &str) -> Result<Vec<ImageRecord>> {
    let folder = PathBuf::from(folder_path);

    if !folder.exists() {
        anyhow::bail!("文件夹不存在: {}", folder_path);
    }

    let mut image_paths = Vec::new();
    let mut entries = fs::read_dir(&folder)
        .await
        .with_context(|| format!("无法读取文件夹: {}", folder_path))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let is_image = path
            .file_name()
            .and_then(|s| s.to_str())
            .map(media_type::is_image)
            .unwrap_or(false);
        if is_image {
            image_paths.push(path);
        }
    }

    image_paths.sort();

    let mut records = Vec::with_capacity(image_paths.len());
    for path in image_paths {
        match load_image(&path).await {
            Ok(record) => {
                tracing::debug!(
                    "已加载: {} ({} 字节)",
                    record.original_name,
                    record.file.bytes.len()
                );
                records.push(record);
            }
            Err(e) => {
                tracing::warn!("加载图片失败 {}: {}", path.display(), e);
            }
        }
    }

    tracing::info!("成功加载 {} 张图片", records.len());

    Ok(records)
}
