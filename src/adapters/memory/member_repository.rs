use indexmap::IndexMap;
use std::sync::RwLock;

use super::poisoned;
use crate::domain::{Member, MemberId};
use crate::ports::member_repository::{MemberRepository, Result};

/// MemberRepositoryのインメモリ実装
#[derive(Debug, Default)]
pub struct InMemoryMemberRepository {
    members: RwLock<IndexMap<MemberId, Member>>,
}

impl InMemoryMemberRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MemberRepository for InMemoryMemberRepository {
    fn get(&self, member_id: MemberId) -> Result<Option<Member>> {
        let members = self.members.read().map_err(poisoned)?;
        Ok(members.get(&member_id).cloned())
    }

    fn save(&self, member: Member) -> Result<()> {
        let mut members = self.members.write().map_err(poisoned)?;
        members.insert(member.id(), member);
        Ok(())
    }

    fn delete(&self, member_id: MemberId) -> Result<bool> {
        let mut members = self.members.write().map_err(poisoned)?;
        Ok(members.shift_remove(&member_id).is_some())
    }

    fn find_by_email(&self, email: &str) -> Result<Option<Member>> {
        let members = self.members.read().map_err(poisoned)?;
        Ok(members
            .values()
            .find(|member| member.email() == email)
            .cloned())
    }

    fn list_all(&self) -> Result<Vec<Member>> {
        let members = self.members.read().map_err(poisoned)?;
        Ok(members.values().cloned().collect())
    }
}
