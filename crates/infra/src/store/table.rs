use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

/// A keyed table that remembers the committed value of every row it
/// changes, so a transaction can be undone without copying the table.
///
/// Every write goes through a method that journals the row's previous value
/// on first touch. [`Table::commit`] forgets the journal, [`Table::rollback`]
/// puts the journaled rows back.
#[derive(Debug, Clone)]
pub struct Table<K, V> {
    rows: HashMap<K, V>,
    /// Previous value per touched key; `None` when the row did not exist.
    journal: HashMap<K, Option<V>>,
}

impl<K, V> Default for Table<K, V> {
    fn default() -> Self {
        Self {
            rows: HashMap::new(),
            journal: HashMap::new(),
        }
    }
}

impl<K, V> Table<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.rows.get(key)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.rows.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.rows.keys()
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.rows.values()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn touch(&mut self, key: &K) {
        if !self.journal.contains_key(key) {
            let before = self.rows.get(key).cloned();
            self.journal.insert(key.clone(), before);
        }
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        if self.rows.contains_key(key) {
            self.touch(key);
        }
        self.rows.get_mut(key)
    }

    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.touch(&key);
        self.rows.insert(key, value)
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        if self.rows.contains_key(key) {
            self.touch(key);
        }
        self.rows.remove(key)
    }

    pub fn get_or_insert_with(&mut self, key: K, make: impl FnOnce() -> V) -> &mut V {
        self.touch(&key);
        self.rows.entry(key).or_insert_with(make)
    }

    /// Remove every row `keep` rejects; returns how many went.
    pub fn retain(&mut self, mut keep: impl FnMut(&K, &V) -> bool) -> usize {
        let doomed: Vec<K> = self
            .rows
            .iter()
            .filter(|(k, v)| !keep(k, v))
            .map(|(k, _)| k.clone())
            .collect();
        for key in &doomed {
            self.remove(key);
        }
        doomed.len()
    }

    /// Apply `change` to every row `select` picks; returns how many it touched.
    pub fn update_where(
        &mut self,
        mut select: impl FnMut(&V) -> bool,
        mut change: impl FnMut(&mut V),
    ) -> usize {
        let picked: Vec<K> = self
            .rows
            .iter()
            .filter(|(_, v)| select(v))
            .map(|(k, _)| k.clone())
            .collect();
        for key in &picked {
            if let Some(row) = self.get_mut(key) {
                change(row);
            }
        }
        picked.len()
    }

    /// Rows changed since the last commit or rollback.
    pub fn touched(&self) -> usize {
        self.journal.len()
    }

    pub fn commit(&mut self) {
        self.journal.clear();
    }

    pub fn rollback(&mut self) {
        for (key, before) in self.journal.drain() {
            match before {
                Some(row) => {
                    self.rows.insert(key, row);
                }
                None => {
                    self.rows.remove(&key);
                }
            }
        }
    }
}
