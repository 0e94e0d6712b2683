//! ID の生成

use uuid::Uuid;

use super::value_object::PeerId;

/// PeerId を払い出すファクトリ
pub struct PeerIdFactory;

impl PeerIdFactory {
    /// UUID v4 から新しい PeerId を生成する
    pub fn generate() -> PeerId {
        PeerId::from_uuid(Uuid::new_v4())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_returns_unique_ids() {
        // テスト項目: 生成される PeerId は毎回異なる
        // given (前提条件):
        let first = PeerIdFactory::generate();

        // when (操作):
        let second = PeerIdFactory::generate();

        // then (期待する結果):
        assert_ne!(first, second);
        assert!(Uuid::parse_str(first.as_str()).is_ok());
    }
}
