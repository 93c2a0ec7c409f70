use mongodb::bson::oid::ObjectId;

/// A product whose freshly extracted price fell strictly below its target.
/// Derived fresh each run, never persisted.
#[derive(Debug, Clone)]
pub struct Deal {
    pub product_id: ObjectId,
    pub user_id: ObjectId,
    pub title: String,
    pub url: String,
    pub current_price: f64,
    pub target_price: f64,
}

impl Deal {
    pub fn savings(&self) -> f64 {
        self.target_price - self.current_price
    }
}

/// Partitions a run's deals by owning user. Users keep their deals in
/// discovery order; users with zero deals never appear.
pub fn group_by_user(deals: Vec<Deal>) -> Vec<(ObjectId, Vec<Deal>)> {
    let mut groups: Vec<(ObjectId, Vec<Deal>)> = Vec::new();

    for deal in deals {
        match groups.iter_mut().find(|(user, _)| *user == deal.user_id) {
            Some((_, list)) => list.push(deal),
            None => groups.push((deal.user_id, vec![deal])),
        }
    }

    groups
}
