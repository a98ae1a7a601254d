use anchor_lang::prelude::*;

use crate::constants::{BPS_DENOMINATOR, MAX_SPLIT_SHARES};
use crate::errors::BountyError;

/// One destination of the revenue split. `shares[0]` is always the pool.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq, InitSpace)]
pub struct SplitShare {
    pub destination: Pubkey,
    pub bps: u16,
}

pub fn validate_split(shares: &[SplitShare]) -> Result<()> {
    require!(!shares.is_empty(), BountyError::InvalidSplit);
    require!(shares.len() <= MAX_SPLIT_SHARES, BountyError::InvalidSplit);

    let mut total: u64 = 0;
    for (i, s) in shares.iter().enumerate() {
        require!(s.bps > 0, BountyError::InvalidSplit);
        require!(s.destination != Pubkey::default(), BountyError::InvalidSplit);
        require!(
            shares[..i].iter().all(|o| o.destination != s.destination),
            BountyError::InvalidSplit
        );
        total += s.bps as u64;
    }
    require!(total == BPS_DENOMINATOR, BountyError::InvalidSplit);

    Ok(())
}

/// Splits `amount` across `shares`. Non-primary shares are rounded down and
/// the primary share takes whatever is left, so the parts always sum to
/// `amount`.
pub fn split_amounts(amount: u64, shares: &[SplitShare]) -> Result<Vec<u64>> {
    validate_split(shares)?;

    let mut out = vec![0u64; shares.len()];
    let mut distributed: u64 = 0;

    for (i, s) in shares.iter().enumerate().skip(1) {
        let part = (amount as u128)
            .checked_mul(s.bps as u128)
            .ok_or(BountyError::ArithmeticOverflow)?
            / BPS_DENOMINATOR as u128;
        // bps < 10_000 here, so part < amount
        out[i] = part as u64;
        distributed = distributed
            .checked_add(out[i])
            .ok_or(BountyError::ArithmeticOverflow)?;
    }

    out[0] = amount
        .checked_sub(distributed)
        .ok_or(BountyError::ArithmeticOverflow)?;

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn shares(bps: &[u16]) -> Vec<SplitShare> {
        bps.iter()
            .map(|&bps| SplitShare { destination: Pubkey::new_unique(), bps })
            .collect()
    }

    #[test]
    fn sixty_twenty_ten_ten() {
        let s = shares(&[6_000, 2_000, 1_000, 1_000]);
        let out = split_amounts(15_000_000, &s).unwrap();
        assert_eq!(out, vec![9_000_000, 3_000_000, 1_500_000, 1_500_000]);
    }

    #[test]
    fn remainder_goes_to_pool() {
        let s = shares(&[3_334, 3_333, 3_333]);
        let out = split_amounts(10, &s).unwrap();
        // 10 * 3333 / 10000 = 3 (rounded down) for both beneficiaries
        assert_eq!(out, vec![4, 3, 3]);
        assert_eq!(out.iter().sum::<u64>(), 10);
    }

    #[test]
    fn pool_only_split() {
        let s = shares(&[10_000]);
        assert_eq!(split_amounts(7, &s).unwrap(), vec![7]);
    }

    #[test]
    fn rejects_bad_configs() {
        assert!(validate_split(&[]).is_err());
        assert!(validate_split(&shares(&[6_000, 3_000])).is_err());
        assert!(validate_split(&shares(&[6_000, 4_001])).is_err());
        assert!(validate_split(&shares(&[10_000, 0])).is_err());
        assert!(validate_split(&shares(&[1_250; 9])).is_err());

        let dup = Pubkey::new_unique();
        let twice = vec![
            SplitShare { destination: dup, bps: 5_000 },
            SplitShare { destination: dup, bps: 5_000 },
        ];
        assert!(validate_split(&twice).is_err());

        let default_dest = vec![SplitShare { destination: Pubkey::default(), bps: 10_000 }];
        assert!(validate_split(&default_dest).is_err());

        assert!(validate_split(&shares(&[1_250; 8])).is_ok());
    }

    #[test]
    fn handles_max_amount() {
        let s = shares(&[6_000, 2_000, 1_000, 1_000]);
        let out = split_amounts(u64::MAX, &s).unwrap();
        assert_eq!(out.iter().map(|&v| v as u128).sum::<u128>(), u64::MAX as u128);
    }

    proptest! {
        #[test]
        fn parts_sum_to_deposit(
            amount in any::<u64>(),
            cuts in proptest::collection::vec(1u16..=1_000, 0..7),
        ) {
            let beneficiaries: u16 = cuts.iter().sum();
            let mut bps = vec![10_000 - beneficiaries];
            bps.extend(cuts);
            let s = shares(&bps);

            let out = split_amounts(amount, &s).unwrap();
            prop_assert_eq!(out.len(), s.len());
            prop_assert_eq!(out.iter().map(|&v| v as u128).sum::<u128>(), amount as u128);
            for (i, share) in s.iter().enumerate().skip(1) {
                prop_assert_eq!(out[i] as u128, amount as u128 * share.bps as u128 / 10_000);
            }
        }
    }
}
