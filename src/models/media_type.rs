//! 扩展名 → 媒体类型映射

use phf::phf_map;

/// 未知扩展名时使用的媒体类型
pub const FALLBACK: &str = "application/octet-stream";

static IMAGE_TYPES: phf::Map<&'static str, &'static str> = phf_map! {
    "jpg" => "image/jpeg",
    "jpeg" => "image/jpeg",
    "png" => "image/png",
    "gif" => "image/gif",
    "webp" => "image/webp",
    "bmp" => "image/bmp",
    "tif" => "image/tiff",
    "tiff" => "image/tiff",
    "heic" => "image/heic",
    "heif" => "image/heif",
};

/// 根据文件名推断媒体类型（大小写不敏感）
pub fn from_file_name(file_name: &str) -> Option<&'static str> {
    let (_, ext) = file_name.rsplit_once('.')?;
    IMAGE_TYPES.get(ext.to_ascii_lowercase().as_str()).copied()
}

/// 是否为支持的图片文件
pub fn is_image(file_name: &str) -> bool {
    from_file_name(file_name).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_file_name() {
        assert_eq!(from_file_name("a.jpg"), Some("image/jpeg"));
        assert_eq!(from_file_name("B.JPEG"), Some("image/jpeg"));
        assert_eq!(from_file_name("scan.final.png"), Some("image/png"));
        assert_eq!(from_file_name("notes.txt"), None);
        assert_eq!(from_file_name("README"), None);
    }

    #[test]
    fn test_is_image() {
        assert!(is_image("photo.webp"));
        assert!(!is_image("labels.toml"));
    }
}
