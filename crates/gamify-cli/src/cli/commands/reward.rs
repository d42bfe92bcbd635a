use super::super::args::{RewardArgs, RewardSub};
use super::context::CommandContext;
use crate::exit_codes::SUCCESS;
use gamify_core::model::{NewReward, Reward};

pub(crate) fn run(ctx: &CommandContext, args: RewardArgs) -> anyhow::Result<i32> {
    match args.cmd {
        RewardSub::Create {
            name,
            description,
            cost,
            max_per_user,
        } => {
            let new = NewReward {
                name,
                description,
                coin_cost: cost,
                max_purchases_per_user: max_per_user,
            };
            let reward = ctx.engine.create_reward(&ctx.tenant, &new)?;
            ctx.emit(&reward, reward_line)?;
        }
        RewardSub::List => {
            let rewards = ctx.engine.list_rewards(&ctx.tenant)?;
            ctx.emit(&rewards, |rs| {
                rs.iter().map(reward_line).collect::<Vec<_>>().join("\n")
            })?;
        }
        RewardSub::Buy { user, reward } => {
            let receipt = ctx.engine.buy_reward(&ctx.tenant, &user, reward)?;
            ctx.emit(&receipt, |r| {
                format!(
                    "purchase {}: reward {} for {} coins, {} left",
                    r.purchase_id, r.reward_id, r.coin_cost_paid, r.remaining_coins
                )
            })?;
        }
        RewardSub::History { user } => {
            let purchases = ctx.engine.purchase_history(&ctx.tenant, &user)?;
            ctx.emit(&purchases, |ps| {
                ps.iter()
                    .map(|p| {
                        format!(
                            "{}  {:<24} {:>6} coins",
                            p.purchased_at.format("%Y-%m-%d %H:%M"),
                            p.reward_name,
                            p.coin_cost_paid
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            })?;
        }
    }
    Ok(SUCCESS)
}

fn reward_line(r: &Reward) -> String {
    let cap = match r.max_purchases_per_user {
        Some(n) => format!(", max {n} per user"),
        None => String::new(),
    };
    format!("reward {} {}: {} coins{cap}", r.id, r.name, r.coin_cost)
}
