//! 重組搜尋
//!
//! 沒有單一負載足以滿足揀貨需求時，跨多個部分耗用的儲位累積箱數。
//! 每個儲位只計入其較小的負載，並優先消耗最小的碎片，以釋放更多儲位。

use wms_core::{Location, LocationId, ProductId, StoreId};

/// 重組計畫：某倉儲中依序消耗的儲位
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefragPlan {
    pub store: StoreId,
    pub locations: Vec<LocationId>,
    /// 累積箱數
    pub accumulated: u32,
}

/// 重組結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefragOutcome {
    pub plan: DefragPlan,
    /// 累積箱數是否達到需求
    pub fully_satisfied: bool,
}

/// 候選儲位：存放此產品、未凍結且尚未預約出庫，依較小負載箱數遞增排序（穩定排序）
pub fn candidate_locations(locations: Vec<Location>, product: ProductId) -> Vec<Location> {
    let mut candidates: Vec<Location> = locations
        .into_iter()
        .filter(|l| l.physically_available_product() == Some(product))
        .filter(|l| !l.has_booked_pickup() && !l.is_frozen())
        .collect();
    candidates.sort_by_key(Location::smallest_load_cases);
    candidates
}

/// 執行重組搜尋
///
/// 依倉儲順序逐一累積候選儲位，第一個達到 `quantity` 的倉儲即返回。
/// 沒有任何倉儲足夠時，返回累積量最大者（同量取先出現者）。
/// 沒有倉儲時返回 `None`。
pub fn defragment<I>(stores: I, product: ProductId, quantity: u32) -> Option<DefragOutcome>
where
    I: IntoIterator<Item = (StoreId, Vec<Location>)>,
{
    let mut best: Option<DefragPlan> = None;

    for (store, locations) in stores {
        let candidates = candidate_locations(locations, product);
        let mut accumulated = 0u32;
        let mut consumed = Vec::with_capacity(candidates.len());

        for location in &candidates {
            accumulated += location.smallest_load_cases();
            consumed.push(location.id);
            if accumulated >= quantity {
                return Some(DefragOutcome {
                    plan: DefragPlan {
                        store,
                        locations: consumed,
                        accumulated,
                    },
                    fully_satisfied: true,
                });
            }
        }

        if best.as_ref().map_or(true, |b| accumulated > b.accumulated) {
            best = Some(DefragPlan {
                store,
                locations: consumed,
                accumulated,
            });
        }
    }

    best.map(|plan| DefragOutcome {
        plan,
        fully_satisfied: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wms_core::UnitLoad;

    const P: ProductId = ProductId(1);

    /// 每個儲位放一個負載
    fn single_loads(product: ProductId, cases: &[u32]) -> Vec<Location> {
        cases
            .iter()
            .enumerate()
            .map(|(i, &n)| {
                let mut location = Location::new(LocationId(i as u32));
                location.put(UnitLoad::tray(product, n)).unwrap();
                location
            })
            .collect()
    }

    #[test]
    fn test_smallest_first_accumulation() {
        let stores = vec![(StoreId(1), single_loads(P, &[10, 3, 4]))];
        let outcome = defragment(stores, P, 6).unwrap();

        assert!(outcome.fully_satisfied);
        assert_eq!(outcome.plan.accumulated, 7);
        assert_eq!(outcome.plan.locations, vec![LocationId(1), LocationId(2)]);
    }

    #[test]
    fn test_insufficient_returns_best_store() {
        let stores = vec![
            (StoreId(1), single_loads(P, &[2, 1])),
            (StoreId(2), single_loads(P, &[4, 3])),
            (StoreId(3), single_loads(P, &[5])),
        ];
        let outcome = defragment(stores, P, 50).unwrap();

        assert!(!outcome.fully_satisfied);
        assert_eq!(outcome.plan.store, StoreId(2));
        assert_eq!(outcome.plan.accumulated, 7);
        assert_eq!(outcome.plan.locations.len(), 2);
    }

    #[test]
    fn test_first_sufficient_store_wins() {
        let stores = vec![
            (StoreId(1), single_loads(P, &[2, 2, 2])),
            (StoreId(2), single_loads(P, &[9])),
        ];
        let outcome = defragment(stores, P, 5).unwrap();

        assert!(outcome.fully_satisfied);
        assert_eq!(outcome.plan.store, StoreId(1));
        assert_eq!(outcome.plan.accumulated, 6);
    }

    #[test]
    fn test_skips_other_products_and_booked() {
        let mut locations = single_loads(P, &[3, 3, 3]);
        locations.push({
            let mut other = Location::new(LocationId(3));
            other.put(UnitLoad::tray(ProductId(2), 1)).unwrap();
            other
        });
        locations[0].book_pickup(wms_core::Slot::Second).unwrap();

        let outcome = defragment(vec![(StoreId(1), locations)], P, 100).unwrap();
        assert!(!outcome.fully_satisfied);
        assert_eq!(outcome.plan.accumulated, 6);
        assert_eq!(outcome.plan.locations, vec![LocationId(1), LocationId(2)]);
    }

    #[test]
    fn test_skips_frozen_locations() {
        let mut locations = single_loads(P, &[1, 4, 5]);
        locations[0].freeze(&UnitLoad::tray(P, 8)).unwrap();
        assert!(locations[0].is_frozen());

        let outcome = defragment(vec![(StoreId(1), locations)], P, 5).unwrap();
        assert!(outcome.fully_satisfied);
        assert_eq!(outcome.plan.locations, vec![LocationId(1), LocationId(2)]);
        assert_eq!(outcome.plan.accumulated, 9);
    }

    #[test]
    fn test_two_deep_counts_smaller_load() {
        let mut location = Location::new(LocationId(0));
        location.put(UnitLoad::tray(P, 10)).unwrap();
        location.put(UnitLoad::tray(P, 2)).unwrap();

        let outcome = defragment(vec![(StoreId(1), vec![location])], P, 5).unwrap();
        assert!(!outcome.fully_satisfied);
        assert_eq!(outcome.plan.accumulated, 2);
    }

    #[test]
    fn test_no_candidates() {
        let outcome = defragment(vec![(StoreId(1), Vec::new())], P, 5).unwrap();
        assert!(!outcome.fully_satisfied);
        assert_eq!(outcome.plan.accumulated, 0);
        assert!(outcome.plan.locations.is_empty());

        assert!(defragment(Vec::new(), P, 5).is_none());
    }
}
