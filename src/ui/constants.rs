// ui/constants.rs

pub const ART: &str = r#"
                 _______
               _/       \_
              /    ___    \         .-----------------------.
             |    /   \    |        |  221B BAKER STREET    |
             |   | o o |   |        '-----------------------'
              \   \_^_/   /               ||
         ______\_________/______          ||      ~   ~
        /   __    |   |    __   \      ___||___  ~  ~
       |   /  \   |   |   /  \   |    |  ____  |   ~
       |  | () |  | o |  | () |  |    | |    | |
        \  \__/   |   |   \__/  /     | |____| |
         \________|___|________/      |________|
"#;

pub const TITLE: &str = r#"  _____ _               _            _
 / ____| |             | |          | |
| (___ | |__   ___ _ __| | ___   ___| | __
 \___ \| '_ \ / _ \ '__| |/ _ \ / __| |/ /
 ____) | | | |  __/ |  | | (_) | (__|   <
|_____/|_| |_|\___|_|  |_|\___/ \___|_|\_\
"#;

pub const INPUT_HINT: &str =
    "Type your action and press Enter. PageUp/PageDown to scroll. /help for commands.";
