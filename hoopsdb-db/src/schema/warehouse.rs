// Diesel table definitions for the `warehouse` schema: dimensions, hubs,
// satellites, and event tables. Hand-maintained rather than generated by
// `diesel print-schema`, since migrations live alongside this crate and the
// two are kept in sync by the migration author, not by tooling.

pub mod warehouse {
    diesel::table! {
        warehouse.seasons (season_id) {
            season_id -> Int8,
            season_end_year -> Int4,
            start_date -> Date,
            end_date -> Date,
            has_playoffs -> Bool,
        }
    }

    diesel::table! {
        warehouse.teams (team_id) {
            team_id -> Int8,
            canonical_abbrev -> Text,
            franchise_name -> Text,
            first_season_end_year -> Int4,
            last_season_end_year -> Nullable<Int4>,
        }
    }

    diesel::table! {
        warehouse.team_history (id) {
            id -> Int8,
            team_id -> Int8,
            season_end_year -> Int4,
            event -> Text,
            detail -> Nullable<Text>,
        }
    }

    diesel::table! {
        warehouse.team_abbrev_mappings (id) {
            id -> Int8,
            abbrev -> Text,
            season_end_year -> Int4,
            team_id -> Int8,
        }
    }

    diesel::table! {
        warehouse.players (player_id) {
            player_id -> Int8,
            canonical_name -> Text,
            birthdate -> Nullable<Date>,
            position -> Nullable<Text>,
            height_inches -> Nullable<Int4>,
            weight_lbs -> Nullable<Int4>,
            career_start_year -> Nullable<Int4>,
            career_end_year -> Nullable<Int4>,
        }
    }

    diesel::table! {
        warehouse.player_aliases (id) {
            id -> Int8,
            player_id -> Int8,
            alias -> Text,
            source -> Text,
        }
    }

    diesel::table! {
        warehouse.games (game_id) {
            game_id -> Int8,
            season_id -> Int8,
            game_date -> Date,
            home_team_id -> Int8,
            away_team_id -> Int8,
            venue -> Nullable<Text>,
            attendance -> Nullable<Int4>,
            status -> Text,
            game_type -> Text,
            home_score -> Nullable<Int4>,
            away_score -> Nullable<Int4>,
        }
    }

    diesel::table! {
        warehouse.boxscore_team (id) {
            id -> Int8,
            game_id -> Int8,
            team_id -> Int8,
            is_home -> Bool,
            pts -> Int4,
            pace -> Nullable<Numeric>,
            off_rtg -> Nullable<Numeric>,
            def_rtg -> Nullable<Numeric>,
        }
    }

    diesel::table! {
        warehouse.boxscore_player (id) {
            id -> Int8,
            game_id -> Int8,
            player_id -> Int8,
            team_id -> Int8,
            min -> Nullable<Int4>,
            fgm -> Nullable<Int4>,
            fga -> Nullable<Int4>,
            fg3m -> Nullable<Int4>,
            fg3a -> Nullable<Int4>,
            ftm -> Nullable<Int4>,
            fta -> Nullable<Int4>,
            reb -> Nullable<Int4>,
            ast -> Nullable<Int4>,
            stl -> Nullable<Int4>,
            blk -> Nullable<Int4>,
            tov -> Nullable<Int4>,
            pts -> Nullable<Int4>,
        }
    }

    diesel::table! {
        warehouse.pbp_events (id) {
            id -> Int8,
            game_id -> Int8,
            eventnum -> Int4,
            period -> Int4,
            clock_remaining -> Int4,
            description -> Nullable<Text>,
            home_score -> Int4,
            away_score -> Int4,
            player1_id -> Nullable<Int8>,
            player2_id -> Nullable<Int8>,
            player3_id -> Nullable<Int8>,
            team_id -> Nullable<Int8>,
            opponent_team_id -> Nullable<Int8>,
            event_type -> Text,
        }
    }

    diesel::table! {
        warehouse.player_season (seas_id) {
            seas_id -> Int8,
            player_id -> Int8,
            season_id -> Int8,
            team_id -> Nullable<Int8>,
            is_total -> Bool,
        }
    }

    diesel::table! {
        warehouse.player_season_per_game (seas_id) {
            seas_id -> Int8,
            gp -> Int4,
            gs -> Nullable<Int4>,
            min -> Nullable<Numeric>,
            pts -> Nullable<Numeric>,
            reb -> Nullable<Numeric>,
            ast -> Nullable<Numeric>,
            stl -> Nullable<Numeric>,
            blk -> Nullable<Numeric>,
            tov -> Nullable<Numeric>,
            fg_pct -> Nullable<Numeric>,
            fg3_pct -> Nullable<Numeric>,
            ft_pct -> Nullable<Numeric>,
        }
    }

    diesel::table! {
        warehouse.player_season_totals (seas_id) {
            seas_id -> Int8,
            gp -> Int4,
            gs -> Nullable<Int4>,
            min -> Nullable<Int4>,
            fgm -> Nullable<Int4>,
            fga -> Nullable<Int4>,
            fg3m -> Nullable<Int4>,
            fg3a -> Nullable<Int4>,
            ftm -> Nullable<Int4>,
            fta -> Nullable<Int4>,
            reb -> Nullable<Int4>,
            ast -> Nullable<Int4>,
            stl -> Nullable<Int4>,
            blk -> Nullable<Int4>,
            tov -> Nullable<Int4>,
            pts -> Nullable<Int4>,
        }
    }

    diesel::table! {
        warehouse.player_season_per36 (seas_id) {
            seas_id -> Int8,
            pts -> Nullable<Numeric>,
            reb -> Nullable<Numeric>,
            ast -> Nullable<Numeric>,
            stl -> Nullable<Numeric>,
            blk -> Nullable<Numeric>,
            tov -> Nullable<Numeric>,
        }
    }

    diesel::table! {
        warehouse.player_season_per100 (seas_id) {
            seas_id -> Int8,
            pts -> Nullable<Numeric>,
            reb -> Nullable<Numeric>,
            ast -> Nullable<Numeric>,
            stl -> Nullable<Numeric>,
            blk -> Nullable<Numeric>,
            tov -> Nullable<Numeric>,
        }
    }

    diesel::table! {
        warehouse.player_season_advanced (seas_id) {
            seas_id -> Int8,
            per -> Nullable<Numeric>,
            ts_pct -> Nullable<Numeric>,
            usg_pct -> Nullable<Numeric>,
            ws -> Nullable<Numeric>,
            bpm -> Nullable<Numeric>,
            vorp -> Nullable<Numeric>,
        }
    }

    diesel::table! {
        warehouse.team_season (team_season_id) {
            team_season_id -> Int8,
            team_id -> Int8,
            season_id -> Int8,
            w -> Int4,
            l -> Int4,
        }
    }

    diesel::table! {
        warehouse.team_season_totals (team_season_id) {
            team_season_id -> Int8,
            pts -> Nullable<Int4>,
            reb -> Nullable<Int4>,
            ast -> Nullable<Int4>,
        }
    }

    diesel::table! {
        warehouse.team_season_per_game (team_season_id) {
            team_season_id -> Int8,
            pts -> Nullable<Numeric>,
            reb -> Nullable<Numeric>,
            ast -> Nullable<Numeric>,
        }
    }

    diesel::table! {
        warehouse.team_season_per100 (team_season_id) {
            team_season_id -> Int8,
            pts -> Nullable<Numeric>,
            reb -> Nullable<Numeric>,
            ast -> Nullable<Numeric>,
        }
    }

    diesel::table! {
        warehouse.team_season_opponent_totals (team_season_id) {
            team_season_id -> Int8,
            pts -> Nullable<Int4>,
            reb -> Nullable<Int4>,
            ast -> Nullable<Int4>,
        }
    }

    diesel::table! {
        warehouse.team_season_opponent_per_game (team_season_id) {
            team_season_id -> Int8,
            pts -> Nullable<Numeric>,
            reb -> Nullable<Numeric>,
            ast -> Nullable<Numeric>,
        }
    }

    diesel::table! {
        warehouse.team_season_opponent_per100 (team_season_id) {
            team_season_id -> Int8,
            pts -> Nullable<Numeric>,
            reb -> Nullable<Numeric>,
            ast -> Nullable<Numeric>,
        }
    }

    diesel::table! {
        warehouse.all_star_selections (id) {
            id -> Int8,
            player_id -> Int8,
            season_end_year -> Int4,
            team_selected_by -> Nullable<Text>,
        }
    }

    diesel::table! {
        warehouse.player_award_shares (id) {
            id -> Int8,
            player_id -> Int8,
            season_end_year -> Int4,
            award -> Text,
            share -> Numeric,
        }
    }

    diesel::table! {
        warehouse.end_of_season_teams (id) {
            id -> Int8,
            player_id -> Int8,
            season_end_year -> Int4,
            team_number -> Int4,
            voting_body -> Text,
        }
    }

    diesel::table! {
        warehouse.end_of_season_voting (id) {
            id -> Int8,
            player_id -> Int8,
            season_end_year -> Int4,
            award -> Text,
            points_won -> Nullable<Numeric>,
            rank -> Nullable<Int4>,
        }
    }

    diesel::table! {
        warehouse.draft_picks (id) {
            id -> Int8,
            year -> Int4,
            round -> Int4,
            pick -> Int4,
            player_id -> Nullable<Int8>,
            team_id -> Nullable<Int8>,
        }
    }

    diesel::table! {
        warehouse.draft_combine_stats (id) {
            id -> Int8,
            player_id -> Nullable<Int8>,
            year -> Int4,
            height_no_shoes -> Nullable<Numeric>,
            wingspan -> Nullable<Numeric>,
            vertical_leap -> Nullable<Numeric>,
        }
    }

    diesel::table! {
        warehouse.game_officials (id) {
            id -> Int8,
            game_id -> Int8,
            official_name -> Text,
        }
    }

    diesel::table! {
        warehouse.player_playbyplay_stats (id) {
            id -> Int8,
            seas_id -> Int8,
            pct_min_at_pg -> Nullable<Numeric>,
            pct_min_at_sg -> Nullable<Numeric>,
            pct_min_at_sf -> Nullable<Numeric>,
            pct_min_at_pf -> Nullable<Numeric>,
            pct_min_at_c -> Nullable<Numeric>,
        }
    }

    diesel::table! {
        warehouse.player_shooting_stats (id) {
            id -> Int8,
            seas_id -> Int8,
            avg_shot_distance -> Nullable<Numeric>,
            pct_fga_2p -> Nullable<Numeric>,
            pct_fga_3p -> Nullable<Numeric>,
        }
    }

    diesel::table! {
        warehouse.team_summaries (team_season_id) {
            team_season_id -> Int8,
            mov -> Nullable<Numeric>,
            sos -> Nullable<Numeric>,
            srs -> Nullable<Numeric>,
            pace -> Nullable<Numeric>,
        }
    }

    diesel::table! {
        warehouse.inactive_players (id) {
            id -> Int8,
            game_id -> Int8,
            player_id -> Int8,
            team_id -> Int8,
        }
    }

    diesel::joinable!(team_history -> teams (team_id));
    diesel::joinable!(team_abbrev_mappings -> teams (team_id));
    diesel::joinable!(player_aliases -> players (player_id));
    diesel::joinable!(games -> seasons (season_id));
    diesel::joinable!(boxscore_team -> games (game_id));
    diesel::joinable!(boxscore_player -> games (game_id));
    diesel::joinable!(pbp_events -> games (game_id));
    diesel::joinable!(player_season -> players (player_id));
    diesel::joinable!(player_season -> seasons (season_id));
    diesel::joinable!(player_season_per_game -> player_season (seas_id));
    diesel::joinable!(player_season_totals -> player_season (seas_id));
    diesel::joinable!(player_season_per36 -> player_season (seas_id));
    diesel::joinable!(player_season_per100 -> player_season (seas_id));
    diesel::joinable!(player_season_advanced -> player_season (seas_id));
    diesel::joinable!(team_season -> teams (team_id));
    diesel::joinable!(team_season -> seasons (season_id));
    diesel::joinable!(team_season_totals -> team_season (team_season_id));
    diesel::joinable!(team_season_per_game -> team_season (team_season_id));
    diesel::joinable!(team_season_per100 -> team_season (team_season_id));
    diesel::joinable!(team_season_opponent_totals -> team_season (team_season_id));
    diesel::joinable!(team_season_opponent_per_game -> team_season (team_season_id));
    diesel::joinable!(team_season_opponent_per100 -> team_season (team_season_id));
    diesel::joinable!(all_star_selections -> players (player_id));
    diesel::joinable!(player_award_shares -> players (player_id));
    diesel::joinable!(end_of_season_teams -> players (player_id));
    diesel::joinable!(end_of_season_voting -> players (player_id));
    diesel::joinable!(draft_picks -> players (player_id));
    diesel::joinable!(draft_picks -> teams (team_id));
    diesel::joinable!(draft_combine_stats -> players (player_id));
    diesel::joinable!(game_officials -> games (game_id));
    diesel::joinable!(player_playbyplay_stats -> player_season (seas_id));
    diesel::joinable!(player_shooting_stats -> player_season (seas_id));
    diesel::joinable!(team_summaries -> team_season (team_season_id));
    diesel::joinable!(inactive_players -> games (game_id));
    diesel::joinable!(inactive_players -> players (player_id));
    diesel::joinable!(inactive_players -> teams (team_id));

    diesel::allow_tables_to_appear_in_same_query!(
        seasons,
        teams,
        team_history,
        team_abbrev_mappings,
        players,
        player_aliases,
        games,
        boxscore_team,
        boxscore_player,
        pbp_events,
        player_season,
        player_season_per_game,
        player_season_totals,
        player_season_per36,
        player_season_per100,
        player_season_advanced,
        team_season,
        team_season_totals,
        team_season_per_game,
        team_season_per100,
        team_season_opponent_totals,
        team_season_opponent_per_game,
        team_season_opponent_per100,
        all_star_selections,
        player_award_shares,
        end_of_season_teams,
        end_of_season_voting,
        draft_picks,
        draft_combine_stats,
        game_officials,
        player_playbyplay_stats,
        player_shooting_stats,
        team_summaries,
        inactive_players,
    );
}
