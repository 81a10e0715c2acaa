use rust_decimal::Decimal;

use crate::domain::{Member, MemberId, NewMember};

use super::errors::{LendingError, Result};
use super::lending_service::{ServiceDependencies, load_member};

/// 会員を登録する
///
/// ビジネスルール：
/// - 入力の違反はすべてまとめて `ValidationFailed` で返す
/// - メールアドレスは会員名簿内で一意（前後の空白を除いて完全一致）
#[tracing::instrument(skip(deps, data))]
pub fn register_member(deps: &ServiceDependencies, data: NewMember) -> Result<Member> {
    let _guard = deps.lock_writes();

    let member = Member::register(data, deps.clock.now())?;

    let existing = deps
        .members
        .find_by_email(member.email())
        .map_err(LendingError::StoreError)?;
    if existing.is_some() {
        tracing::warn!("duplicate email rejected");
        return Err(LendingError::DuplicateEmail(member.email().to_string()));
    }

    deps.members
        .save(member.clone())
        .map_err(LendingError::StoreError)?;

    tracing::info!(member_id = %member.id(), "member registered");
    Ok(member)
}

pub fn get_member(deps: &ServiceDependencies, member_id: MemberId) -> Result<Member> {
    load_member(deps, member_id)
}

/// 罰金を支払う
///
/// 残高を超える支払いと負の金額は拒否する。罰金による利用停止は、
/// 残高が閾値を下回った時点で自動的に解除される。
#[tracing::instrument(skip(deps))]
pub fn pay_fine(deps: &ServiceDependencies, member_id: MemberId, amount: Decimal) -> Result<Member> {
    let _guard = deps.lock_writes();

    let mut member = load_member(deps, member_id)?;
    if let Err(err) = member.pay_fine(amount) {
        tracing::warn!(reason = %err, "fine payment refused");
        return Err(err.into());
    }

    deps.members
        .save(member.clone())
        .map_err(LendingError::StoreError)?;

    tracing::info!(balance = %member.fine_balance(), status = %member.status(), "fine paid");
    Ok(member)
}

#[tracing::instrument(skip(deps))]
pub fn suspend_member(deps: &ServiceDependencies, member_id: MemberId) -> Result<Member> {
    update_member(deps, member_id, |member| {
        member.suspend();
        Ok(())
    })
}

/// 会員を再有効化する（罰金が残っていれば失敗）
#[tracing::instrument(skip(deps))]
pub fn activate_member(deps: &ServiceDependencies, member_id: MemberId) -> Result<Member> {
    update_member(deps, member_id, |member| {
        member.activate().map_err(LendingError::from)
    })
}

#[tracing::instrument(skip(deps))]
pub fn deactivate_member(deps: &ServiceDependencies, member_id: MemberId) -> Result<Member> {
    update_member(deps, member_id, |member| {
        member.deactivate();
        Ok(())
    })
}

fn update_member<F>(deps: &ServiceDependencies, member_id: MemberId, change: F) -> Result<Member>
where
    F: FnOnce(&mut Member) -> Result<()>,
{
    let _guard = deps.lock_writes();

    let mut member = load_member(deps, member_id)?;
    if let Err(err) = change(&mut member) {
        tracing::warn!(reason = %err, "member status change refused");
        return Err(err);
    }

    deps.members
        .save(member.clone())
        .map_err(LendingError::StoreError)?;

    tracing::info!(status = %member.status(), "member status changed");
    Ok(member)
}
