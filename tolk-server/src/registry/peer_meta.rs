use tolk_core::{EntityId, JoinRequest, LanguagePair, Member, MetaUpdate, PeerKey, Role};

/// What a connection has announced about itself through `join` and `update-meta`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PeerMeta {
    pub id: Option<String>,
    pub role: Role,
    pub src: Option<String>,
    pub tgt: Option<String>,
    pub pairs: Vec<LanguagePair>,
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(str::to_owned)
}

impl PeerMeta {
    /// Later joins only overwrite the fields they carry.
    pub fn apply_join(&mut self, req: &JoinRequest) {
        if req.role != Role::Unknown {
            self.role = req.role;
        }
        if let Some(id) = non_empty(&req.id) {
            self.id = Some(id);
        }
        if let Some(src) = non_empty(&req.src) {
            self.src = Some(src);
        }
        if let Some(tgt) = non_empty(&req.tgt) {
            self.tgt = Some(tgt);
        }
        if !req.pairs.is_empty() {
            self.pairs = req.pairs.clone();
        }
    }

    pub fn apply_update(&mut self, update: &MetaUpdate) {
        if let Some(role) = update.role {
            self.role = role;
        }
        if let Some(src) = non_empty(&update.src) {
            self.src = Some(src);
        }
        if let Some(tgt) = non_empty(&update.tgt) {
            self.tgt = Some(tgt);
        }
        if let Some(pairs) = &update.pairs {
            self.pairs = pairs.clone();
        }
    }

    /// Public view used in `room-info`, `peer-joined` and `peer-left`.
    pub fn member(&self, key: &PeerKey) -> Member {
        Member {
            id: EntityId::Text(self.id.clone().unwrap_or_else(|| key.to_string())),
            sid: Some(key.to_string()),
            role: self.role,
            src: self.src.clone(),
            tgt: self.tgt.clone(),
            pairs: self.pairs.clone(),
        }
    }
}
