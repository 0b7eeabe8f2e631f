//src/dungeon/src/deck.rs
use content::ContentTables;
use rand::{Rng, seq::SliceRandom};
use serde::Serialize;
use tracing::debug;

/// 抽牌堆：抽牌区 + 弃牌区，抽空时弃牌洗回
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Deck<T> {
    draw: Vec<T>,
    discard: Vec<T>,
}

impl<T> Deck<T> {
    /// 以给定全体牌面建堆，并洗一次
    pub fn new<R: Rng + ?Sized>(mut population: Vec<T>, rng: &mut R) -> Self {
        population.shuffle(rng);
        Self {
            draw: population,
            discard: Vec::new(),
        }
    }

    fn recycle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.draw.append(&mut self.discard);
        self.draw.shuffle(rng);
        debug!(size = self.draw.len(), "deck reshuffled");
    }

    /// 抽一张并移入弃牌区；两区都空时返回 None
    pub fn draw<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<T>
    where
        T: Clone,
    {
        if self.draw.is_empty() {
            self.recycle(rng);
        }
        let card = self.draw.pop()?;
        self.discard.push(card.clone());
        Some(card)
    }

    /// 在抽牌区满足条件的牌中均匀抽一张；没有则洗回弃牌再试一次
    pub fn draw_matching<R, P>(&mut self, rng: &mut R, mut pred: P) -> Option<T>
    where
        T: Clone,
        R: Rng + ?Sized,
        P: FnMut(&T) -> bool,
    {
        for attempt in 0..2 {
            if attempt == 1 {
                if self.discard.is_empty() {
                    break;
                }
                self.recycle(rng);
            }
            let matches: Vec<usize> = self
                .draw
                .iter()
                .enumerate()
                .filter(|(_, card)| pred(card))
                .map(|(i, _)| i)
                .collect();
            if matches.is_empty() {
                continue;
            }
            let idx = matches[rng.random_range(0..matches.len())];
            let card = self.draw.remove(idx);
            self.discard.push(card.clone());
            return Some(card);
        }
        None
    }

    /// 抽牌区 + 弃牌区
    pub fn population(&self) -> usize {
        self.draw.len() + self.discard.len()
    }

    pub fn draw_pile(&self) -> &[T] {
        &self.draw
    }

    pub fn discard_pile(&self) -> &[T] {
        &self.discard
    }
}

/// 一局游戏的四个牌堆
#[derive(Debug, Clone, Serialize)]
pub struct Decks {
    /// 财宝基础值
    pub treasure: Deck<u32>,
    pub skills: Deck<String>,
    pub items: Deck<String>,
    pub gear: Deck<String>,
}

impl Decks {
    pub fn build<R: Rng + ?Sized>(content: &ContentTables, rng: &mut R) -> Self {
        Self {
            treasure: Deck::new(content.treasure_population().to_vec(), rng),
            skills: Deck::new(content.skills().iter().map(|s| s.id.clone()).collect(), rng),
            items: Deck::new(content.items().iter().map(|i| i.id.clone()).collect(), rng),
            gear: Deck::new(content.gear_list().iter().map(|g| g.id.clone()).collect(), rng),
        }
    }
}
