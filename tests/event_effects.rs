mod helpers;

use dice_crawl::{EquipSlot, GameEvent, Phase, TileKind};
use dungeon::ForcedStop;
use helpers::{ContentBuilder, session, session_with_seed};
use pretty_assertions::assert_eq;

const POTION: &str =
    r#"{ "id": "potion", "name": "Potion", "effectKey": "heal_hp_expr", "params": { "expr": "2d6" } }"#;
const SWORD: &str = r#"{ "id": "sword", "name": "Sword", "slot": "weapon" }"#;

/// 1 号格是唯一的事件格
fn one_event(json: &str) -> ContentBuilder {
    ContentBuilder::new().tile(1, TileKind::Event).events(&[json])
}

#[test]
fn test_lost_and_found_grants_item_or_gear() {
    let mut got_item = false;
    let mut got_gear = false;

    for seed in 0..16 {
        let content = one_event(r#"{ "id": "lost", "name": "Lost and Found", "effectKey": "lostAndFound" }"#)
            .item(POTION)
            .gear(SWORD)
            .build();
        let mut game = session_with_seed(content, 1, seed);
        {
            let p = game.current_player();
            assert_eq!((p.items.len(), p.gear_bag.len()), (1, 0));
            assert_eq!(p.equipment.get(EquipSlot::Weapon), Some("sword"));
        }

        assert!(game.move_steps(1));
        let p = game.current_player();
        // 财宝不受影响
        assert_eq!(p.bag, vec![10], "seed {seed}");
        match (p.items.len(), p.gear_bag.len()) {
            (2, 0) => got_item = true,
            // 武器槽已占用，新装备进装备袋
            (1, 1) => got_gear = true,
            other => panic!("seed {seed}: items/gear bag {other:?}"),
        }
        assert_eq!(game.phase(), Phase::AwaitingContinue);
    }

    assert!(got_item && got_gear);
}

#[test]
fn test_steal_takes_lowest_from_rival() {
    let content = one_event(r#"{ "id": "thief", "name": "Pickpocket", "effectKey": "stealLowestTreasure" }"#).build();
    let mut game = session(content, 2);
    game.player_mut(1).unwrap().bag = vec![40, 20];

    assert!(game.move_steps(1));
    assert_eq!(game.player(0).unwrap().bag, vec![10, 20]);
    assert_eq!(game.player(1).unwrap().bag, vec![40]);
    assert_eq!(game.phase(), Phase::AwaitingContinue);
}

#[test]
fn test_steal_without_rivals_does_nothing() {
    let content = one_event(r#"{ "id": "thief", "name": "Pickpocket", "effectKey": "stealLowestTreasure" }"#).build();
    let mut game = session(content, 1);

    assert!(game.move_steps(1));
    assert_eq!(game.current_player().bag, vec![10]);
    assert!(game.log().contains("no one to steal from"));
    assert_eq!(game.phase(), Phase::AwaitingContinue);
}

#[test]
fn test_disable_breaks_equipped_piece() {
    let content = one_event(r#"{ "id": "rust", "name": "Rust Trap", "effectKey": "disableEquippedItem" }"#)
        .gear(SWORD)
        .build();
    let mut game = session(content, 1);
    assert_eq!(game.current_player().equipment.occupied(), vec![EquipSlot::Weapon]);

    assert!(game.move_steps(1));
    let p = game.current_player();
    assert!(p.equipment.occupied().is_empty());
    // 损坏的装备直接消失，不回装备袋
    assert!(p.gear_bag.is_empty());
    assert!(game.log().contains("sword breaks"));
}

#[test]
fn test_lose_lowest_drops_cheapest_treasure() {
    let content = one_event(r#"{ "id": "pit", "name": "Pitfall", "effectKey": "loseLowestTreasure" }"#).build();
    let mut game = session(content, 1);
    game.player_mut(0).unwrap().bag = vec![30, 5, 50];

    assert!(game.move_steps(1));
    assert_eq!(game.current_player().bag, vec![30, 50]);
}

#[test]
fn test_warp_backwards_wraps_around_the_board() {
    let content = one_event(
        r#"{ "id": "warp", "name": "Warp", "effectKey": "warpByD6", "params": { "oddDelta": -2, "evenDelta": -2 } }"#,
    )
    .build();
    let mut game = session(content, 1);

    assert!(game.move_steps(1));
    let p = game.current_player();
    // 1 -> 0 -> 39，后退不加深度，并被 BOSS 格拦下
    assert_eq!((p.pos, p.depth), (39, 1));
    assert!(game.event_history().iter().any(|e| matches!(
        e,
        GameEvent::Moved { from: 1, to: 39, forced: Some(ForcedStop::Boss), .. }
    )));
    assert_eq!(game.phase(), Phase::InBattle);
    assert!(game.battle().unwrap().is_boss());
}

#[test]
fn test_warp_forward_resolves_new_tile() {
    let content = one_event(
        r#"{ "id": "warp", "name": "Warp", "effectKey": "warpByD6", "params": { "oddDelta": 3, "evenDelta": 3 } }"#,
    )
    .build();
    let mut game = session(content, 1);

    assert!(game.move_steps(1));
    assert_eq!(game.current_player().pos, 4);
    assert_eq!(
        game.event_history()
            .iter()
            .filter(|e| e.event_type() == "CooldownUpkeep")
            .count(),
        1
    );
    assert_eq!(game.phase(), Phase::AwaitingContinue);
}

#[test]
fn test_unknown_event_grants_a_trinket() {
    let content = one_event(r#"{ "id": "odd", "name": "Odd Shrine", "effectKey": "mysteryShrine" }"#).build();
    let mut game = session(content, 1);

    assert!(game.move_steps(1));
    assert_eq!(game.current_player().bag, vec![10, 10]);
    assert!(game.log().contains("pocket a trinket"));
    assert_eq!(game.continue_label(), Some("Next player"));
    assert_eq!(game.phase(), Phase::AwaitingContinue);
}

#[test]
fn test_boss_tile_ignores_skip_flag() {
    let content = ContentBuilder::new().build();
    let mut game = session(content, 1);
    {
        let p = game.player_mut(0).unwrap();
        p.pos = 38;
        p.skip_next_tile = true;
    }

    assert!(game.move_steps(1));
    assert!(!game.current_player().skip_next_tile);
    assert!(!game.log().contains("(effect skipped)"));
    assert_eq!(game.phase(), Phase::InBattle);
    assert!(game.battle().unwrap().is_boss());
}
