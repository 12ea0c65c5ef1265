use crate::transactions::AssetCategory;

/// Stable chart color per asset category. The mapping is deterministic: the
/// same category always renders in the same palette slot.
pub fn category_color(category: AssetCategory) -> &'static str {
    match category {
        AssetCategory::TwStock => "#3b82f6",
        AssetCategory::UsStock => "#8b5cf6",
        AssetCategory::Crypto => "#f59e0b",
        AssetCategory::Fiat => "#22c55e",
        AssetCategory::Liability => "#ef4444",
    }
}
