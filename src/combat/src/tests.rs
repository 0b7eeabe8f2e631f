// src/combat/src/tests.rs
use content::{ContentTables, Element, MonsterDef};
use dice::{DiceExpr, GameRng};
use dungeon::Deck;
use hero::Player;
use pretty_assertions::assert_eq;

use super::*;

struct Fixture {
    content: ContentTables,
    player: Player,
    battle: BattleSession,
    rng: GameRng,
    treasure: Deck<u32>,
}

fn monster(hp: i32, atk: DiceExpr, def: DiceExpr, weakness: Element) -> MonsterDef {
    MonsterDef {
        id: "dummy".into(),
        name: "Training Dummy".into(),
        hp,
        mp: 0,
        atk_expr: atk,
        def_expr: def,
        weakness,
        depth: None,
    }
}

/// Harmless enemy: no attack, no defense, weak to magic.
fn dummy(hp: i32) -> MonsterDef {
    monster(hp, DiceExpr::flat(0), DiceExpr::flat(0), Element::Magic)
}

impl Fixture {
    fn new(job: &str, enemy: MonsterDef) -> Self {
        let content = ContentTables::builtin().unwrap();
        let mut rng = GameRng::new(7);
        let mut player = Player::new("P1", content.job(job).unwrap(), &mut rng);
        player.hp = 20;
        player.hp_max = 20;
        player.mp = 10;
        player.mp_max = 10;
        let treasure = Deck::new(content.treasure_population().to_vec(), &mut rng);
        let battle = BattleSession::new(BattleKind::Normal, &enemy, 0, 0);
        Self {
            content,
            player,
            battle,
            rng,
            treasure,
        }
    }

    fn with_skill(mut self, id: &str) -> Self {
        assert!(self.player.skills.equip(id));
        self
    }

    fn with_item(mut self, id: &str) -> Self {
        self.player.items.push(id.to_string());
        self
    }

    fn combat(&mut self) -> Combat<'_> {
        Combat::new(
            &mut self.battle,
            &mut self.player,
            &self.content,
            &mut self.rng,
            &mut self.treasure,
        )
    }
}

#[test]
fn test_cast_pays_cost_and_blocks_recast() {
    let mut fx = Fixture::new("hero", dummy(1000)).with_skill("he_valor");
    fx.player.mp = 3;

    let result = fx.combat().cast_skill("he_valor");
    assert_eq!(
        result.outcome,
        ActionOutcome::EnemyTurn {
            skip_ct: Some("he_valor".into())
        }
    );
    assert_eq!(fx.player.mp, 0);
    assert_eq!(fx.player.skills.cooldown("he_valor"), 2);
    assert!(fx.battle.locked);

    // still waiting for the enemy reply
    let again = fx.combat().cast_skill("he_valor");
    assert_eq!(again.outcome, ActionOutcome::Rejected(Rejection::Locked));

    let reply = fx.combat().enemy_reply(Some("he_valor"));
    assert_eq!(reply.outcome, ActionOutcome::PlayerTurn);
    assert_eq!(fx.player.skills.cooldown("he_valor"), 2);
    assert_eq!(fx.player.mp, 1);

    let again = fx.combat().cast_skill("he_valor");
    assert_eq!(
        again.outcome,
        ActionOutcome::Rejected(Rejection::OnCooldown {
            name: "Valor Strike".into(),
            ct: 2
        })
    );
    assert_eq!(fx.player.mp, 1);
}

#[test]
fn test_fixed_damage_kill_skips_enemy_turn() {
    let mut enemy = dummy(5);
    enemy.atk_expr = DiceExpr::flat(50);
    let mut fx = Fixture::new("swordsman", enemy).with_skill("sw_level_cut");

    let result = fx.combat().cast_skill("sw_level_cut");
    assert_eq!(result.outcome, ActionOutcome::Victory);
    assert_eq!(fx.battle.enemy.hp, 0);
    assert_eq!(fx.player.hp, 20);
    assert_eq!(fx.player.mp, 6);
    assert!(!fx.battle.locked);
}

#[test]
fn test_not_enough_mp_is_rejected_without_side_effects() {
    let mut fx = Fixture::new("hero", dummy(1000)).with_skill("he_destiny");
    fx.player.mp = 5;

    let result = fx.combat().cast_skill("he_destiny");
    assert!(result.is_rejected());
    assert_eq!(fx.player.mp, 5);
    assert_eq!(fx.player.skills.cooldown("he_destiny"), 0);
    assert!(!fx.battle.locked);
}

#[test]
fn test_guaranteed_win_once_per_dive() {
    let mut fx = Fixture::new("hero", dummy(1000)).with_skill("he_destiny");

    let result = fx.combat().cast_skill("he_destiny");
    assert_eq!(result.outcome, ActionOutcome::Victory);
    assert!(fx.player.win_once_used);

    fx.battle = BattleSession::new(BattleKind::Boss, &dummy(1000), 0, 0);
    fx.player.skills.set_cooldown("he_destiny", 0);
    fx.player.mp = 10;
    let result = fx.combat().cast_skill("he_destiny");
    assert_eq!(
        result.outcome,
        ActionOutcome::Rejected(Rejection::WinOnceUsed("Destiny".into()))
    );
    assert_eq!(fx.player.mp, 10);
}

#[test]
fn test_skill_must_be_equipped() {
    let mut fx = Fixture::new("hero", dummy(1000));
    let result = fx.combat().cast_skill("he_valor");
    assert!(matches!(
        result.outcome,
        ActionOutcome::Rejected(Rejection::SkillNotEquipped(_))
    ));
    let result = fx.combat().cast_skill("no_such_skill");
    assert!(matches!(
        result.outcome,
        ActionOutcome::Rejected(Rejection::UnknownSkill(_))
    ));
}

#[test]
fn test_evade_negates_enemy_attack() {
    let enemy = monster(1000, DiceExpr::flat(40), DiceExpr::flat(0), Element::Magic);
    let mut fx = Fixture::new("thief", enemy).with_skill("th_smoke");
    fx.battle.last_damage_taken = 9;

    let result = fx.combat().cast_skill("th_smoke");
    assert!(matches!(result.outcome, ActionOutcome::EnemyTurn { .. }));
    assert_eq!(fx.battle.status.evade_turns, 1);

    let reply = fx.combat().enemy_reply(Some("th_smoke"));
    assert_eq!(reply.outcome, ActionOutcome::PlayerTurn);
    assert_eq!(fx.player.hp, 20);
    assert_eq!(fx.battle.last_damage_taken, 0);
    assert_eq!(fx.battle.status.evade_turns, 0);
    assert_eq!(fx.battle.turn, 2);
}

#[test]
fn test_ward_reduces_next_hit_and_is_consumed() {
    // ATK 10 vs DEF >= 1d6 from the priest's base expression
    let enemy = monster(1000, DiceExpr::flat(10), DiceExpr::flat(0), Element::Magic);
    let mut fx = Fixture::new("priest", enemy).with_item("iron_charm");
    fx.player.def_expr = DiceExpr::new(1, 0);

    let result = fx.combat().use_item("iron_charm");
    assert_eq!(result.outcome, ActionOutcome::PlayerTurn);
    assert_eq!(fx.battle.status.next_damage_minus, 5);

    fx.battle.locked = true;
    fx.combat().enemy_reply(None);
    let taken = fx.battle.last_damage_taken;
    assert!((0..=4).contains(&taken), "taken {taken}");
    assert_eq!(fx.player.hp, 20 - taken);
    assert_eq!(fx.battle.status.next_damage_minus, 0);
}

#[test]
fn test_enemy_kill_is_defeat() {
    let enemy = monster(1000, DiceExpr::flat(60), DiceExpr::flat(0), Element::Magic);
    let mut fx = Fixture::new("mage", enemy);
    fx.player.hp = 5;
    fx.battle.locked = true;

    let reply = fx.combat().enemy_reply(None);
    assert_eq!(reply.outcome, ActionOutcome::Defeat);
    assert_eq!(fx.player.hp, 0);
    assert_eq!(fx.battle.turn, 1);
}

#[test]
fn test_turn_limit_times_out() {
    let mut fx = Fixture::new("mage", dummy(1000));
    fx.battle.turn = fx.battle.turn_limit;
    fx.battle.locked = true;

    let reply = fx.combat().enemy_reply(None);
    assert_eq!(reply.outcome, ActionOutcome::TimedOut);
    assert!(!fx.battle.locked);
}

#[test]
fn test_poison_ticks_before_enemy_turn() {
    let enemy = monster(1000, DiceExpr::flat(0), DiceExpr::flat(100), Element::Magic);
    let mut fx = Fixture::new("archer", enemy).with_item("poison_needle");

    let result = fx.combat().use_item("poison_needle");
    assert_eq!(result.outcome, ActionOutcome::PlayerTurn);
    assert_eq!(fx.battle.enemy.poison_turns, 3);
    assert!(fx.player.items.is_empty());

    let result = fx.combat().normal_attack();
    assert!(matches!(result.outcome, ActionOutcome::EnemyTurn { .. }));
    assert_eq!(fx.battle.enemy.poison_turns, 2);
    // one point from the attack, 1d6 from the poison
    let hp = fx.battle.enemy.hp;
    assert!((1000 - 7..=1000 - 2).contains(&hp), "enemy hp {hp}");
}

#[test]
fn test_poison_can_finish_the_enemy() {
    let enemy = monster(2, DiceExpr::flat(0), DiceExpr::flat(100), Element::Magic);
    let mut fx = Fixture::new("archer", enemy);
    fx.battle.enemy.apply_poison(2, None);

    let result = fx.combat().normal_attack();
    assert_eq!(result.outcome, ActionOutcome::Victory);
    assert_eq!(fx.battle.enemy.hp, 0);
    assert!(!fx.battle.locked);
}

#[test]
fn test_one_free_item_per_enemy_turn() {
    let mut fx = Fixture::new("priest", dummy(1000))
        .with_item("potion")
        .with_item("ether");

    assert_eq!(fx.combat().use_item("potion").outcome, ActionOutcome::PlayerTurn);
    assert!(fx.battle.free_item_used);
    assert_eq!(
        fx.combat().use_item("ether").outcome,
        ActionOutcome::Rejected(Rejection::FreeItemUsed)
    );
    assert_eq!(fx.player.items, vec!["ether".to_string()]);

    fx.battle.locked = true;
    fx.combat().enemy_reply(None);
    assert!(!fx.battle.free_item_used);
    assert_eq!(fx.combat().use_item("ether").outcome, ActionOutcome::PlayerTurn);
}

#[test]
fn test_fire_bottle_takes_the_action() {
    let mut fx = Fixture::new("mage", dummy(100)).with_item("fire_bottle");

    let result = fx.combat().use_item("fire_bottle");
    assert_eq!(result.outcome, ActionOutcome::EnemyTurn { skip_ct: None });
    // 8 magic against a magic weakness
    assert_eq!(fx.battle.enemy.hp, 84);
    assert!(fx.player.items.is_empty());
    assert!(!fx.battle.free_item_used);
}

#[test]
fn test_ct_item_cancel_keeps_the_item() {
    let mut fx = Fixture::new("swordsman", dummy(1000))
        .with_skill("sw_heavy")
        .with_item("swift_talisman");
    fx.player.skills.set_cooldown("sw_heavy", 3);

    let result = fx.combat().use_item("swift_talisman");
    assert_eq!(
        result.outcome,
        ActionOutcome::ChooseCtTarget {
            item_id: "swift_talisman".into(),
            delta: 2
        }
    );
    assert!(fx.battle.locked);

    let result = fx.combat().cancel_item();
    assert_eq!(result.outcome, ActionOutcome::PlayerTurn);
    assert!(!fx.battle.locked);
    assert_eq!(fx.player.items, vec!["swift_talisman".to_string()]);
    assert_eq!(fx.player.skills.cooldown("sw_heavy"), 3);

    fx.combat().use_item("swift_talisman");
    let result = fx.combat().apply_ct_reduction("swift_talisman", "sw_heavy", 2);
    assert_eq!(result.outcome, ActionOutcome::PlayerTurn);
    assert_eq!(fx.player.skills.cooldown("sw_heavy"), 1);
    assert!(fx.player.items.is_empty());
    assert!(fx.battle.free_item_used);
}

#[test]
fn test_ct_item_without_skills_is_declined() {
    let mut fx = Fixture::new("swordsman", dummy(1000)).with_item("swift_talisman");

    let result = fx.combat().use_item("swift_talisman");
    assert!(matches!(
        result.outcome,
        ActionOutcome::Rejected(Rejection::NoSkillToTarget(_))
    ));
    assert!(!fx.battle.locked);
    assert_eq!(fx.player.items.len(), 1);
}

#[test]
fn test_guaranteed_escape_with_bonuses() {
    // thief +2, rope +3: any die succeeds
    let mut fx = Fixture::new("thief", dummy(1000)).with_item("escape_rope");
    fx.combat().use_item("escape_rope");
    assert_eq!(fx.battle.status.escape_bonus_next, 3);

    let result = fx.combat().escape();
    assert_eq!(result.outcome, ActionOutcome::Escaped);
    assert_eq!(fx.battle.status.escape_bonus_next, 0);
}

#[test]
fn test_staged_element_is_consumed_by_one_attack() {
    let mut fx = Fixture::new("swordsman", dummy(1000)).with_item("mana_paper");
    fx.combat().use_item("mana_paper");
    assert_eq!(fx.battle.status.next_attack_element, Some(Element::Magic));

    fx.combat().normal_attack();
    assert_eq!(fx.battle.status.next_attack_element, None);
    // weakness doubles at least 1d6
    assert!(fx.battle.enemy.hp <= 998);
}

#[test]
fn test_revenge_uses_last_damage_taken() {
    let mut fx = Fixture::new("archer", dummy(1000)).with_skill("ar_revenge");
    fx.battle.last_damage_taken = 7;

    fx.combat().cast_skill("ar_revenge");
    // physical against a magic weakness: no doubling
    assert_eq!(fx.battle.enemy.hp, 993);
}

#[test]
fn test_last_stand_triples_at_one_hp() {
    let mut fx = Fixture::new("swordsman", dummy(1000)).with_skill("sw_last_stand");
    fx.combat().cast_skill("sw_last_stand");
    assert!(fx.battle.status.hp1_triple);

    fx.player.hp = 1;
    let opts = AttackOpts {
        fixed: Some(4),
        ..AttackOpts::with_element(Element::Physical)
    };
    let hit = fx.combat().attack_once("Test", opts);
    assert_eq!(hit, 12);
}

#[test]
fn test_hp_to_mp_never_kills() {
    let mut fx = Fixture::new("mage", dummy(1000)).with_skill("mg_convert");
    fx.player.hp = 1;
    fx.player.mp = 0;

    fx.combat().cast_skill("mg_convert");
    assert_eq!(fx.player.hp, 1);
    assert!(fx.player.mp >= 1);
}

#[test]
fn test_pilfer_adds_depth_scaled_treasure() {
    let mut fx = Fixture::new("thief", dummy(1000)).with_skill("th_pilfer");
    fx.player.depth = 2;

    fx.combat().cast_skill("th_pilfer");
    assert_eq!(fx.player.bag.len(), 1);
    assert_eq!(fx.player.bag[0] % 2, 0);
    assert_eq!(fx.treasure.discard_pile().len(), 1);
}

#[test]
fn test_exp_formula() {
    let slime = monster(8, DiceExpr::new(1, 0), DiceExpr::new(1, 0), Element::Magic);
    let mut battle = BattleSession::new(BattleKind::Normal, &slime, 0, 0);
    // (8 + 0 + 3.5 + 3.5) / 4 = 3.75
    assert_eq!(exp_from_battle(&battle), 4);
    battle.exp_mult = 2.0;
    assert_eq!(exp_gained(&battle), 8);

    let boss = BattleSession::new(BattleKind::Boss, &slime, 0, 0);
    assert_eq!(exp_from_battle(&boss), 6);
    assert_eq!(boss.turn_limit, constants::BOSS_TURN_LIMIT);
}
