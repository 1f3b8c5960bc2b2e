use dioxus::prelude::*;
use form_core::model::{Answer, BlockId, BlockKind, FileHandle};

use crate::vm::{AnswerInput, KeyPress, NavIntent, NavKey, ResponseBlockVm, intent_for_kind};

#[cfg(test)]
use std::cell::RefCell;
#[cfg(test)]
use std::rc::Rc;

const PHONE_REGIONS: [&str; 8] = ["IN", "US", "GB", "CA", "AU", "DE", "FR", "SG"];

fn nav_key(key: &Key) -> Option<NavKey> {
    match key {
        Key::ArrowUp => Some(NavKey::ArrowUp),
        Key::ArrowDown => Some(NavKey::ArrowDown),
        Key::Enter => Some(NavKey::Enter),
        _ => None,
    }
}

const fn input_type(kind: BlockKind) -> &'static str {
    match kind {
        BlockKind::Email => "email",
        BlockKind::Url => "url",
        BlockKind::Number => "number",
        BlockKind::Date => "date",
        _ => "text",
    }
}

fn region_options(current: &str) -> Vec<String> {
    let mut regions: Vec<String> = PHONE_REGIONS.iter().map(|r| (*r).to_string()).collect();
    if !regions.iter().any(|r| r == current) {
        regions.insert(0, current.to_string());
    }
    regions
}

fn render_input(vm: &ResponseBlockVm, on_input: Callback<AnswerInput>) -> Element {
    let value = vm.answer_text();
    match vm.kind {
        BlockKind::Statement => rsx! {},
        BlockKind::LongText => rsx! {
            textarea {
                id: "response-input",
                class: "response-input response-textarea",
                placeholder: vm.placeholder.clone(),
                value: "{value}",
                oninput: move |evt| on_input.call(AnswerInput::Text(evt.value())),
            }
        },
        BlockKind::Phone => {
            let region = vm.phone_region().to_string();
            rsx! {
                div { class: "response-phone",
                    select {
                        class: "response-phone-region",
                        onchange: move |evt| on_input.call(AnswerInput::PhoneRegion(evt.value())),
                        for code in region_options(&region) {
                            option { key: "{code}", value: "{code}", selected: code == region, "{code}" }
                        }
                    }
                    input {
                        id: "response-input",
                        class: "response-input",
                        r#type: "tel",
                        placeholder: vm.placeholder.clone(),
                        value: "{value}",
                        oninput: move |evt| on_input.call(AnswerInput::PhoneNumber(evt.value())),
                    }
                }
            }
        }
        BlockKind::SingleSelect | BlockKind::MultiSelect => rsx! {
            div { class: "response-options",
                for option in vm.options.iter().cloned() {
                    button {
                        key: "{option}",
                        class: if vm.is_selected(&option) { "response-option selected" } else { "response-option" },
                        r#type: "button",
                        onclick: {
                            let picked = option.clone();
                            move |_| on_input.call(AnswerInput::Option(picked.clone()))
                        },
                        "{option}"
                    }
                }
            }
        },
        BlockKind::Dropdown => rsx! {
            select {
                id: "response-input",
                class: "response-select",
                onchange: move |evt| on_input.call(AnswerInput::Option(evt.value())),
                option { value: "", disabled: true, selected: vm.answer.is_none(),
                    {vm.placeholder.clone().unwrap_or_default()}
                }
                for option in vm.options.iter() {
                    option { key: "{option}", value: "{option}", selected: vm.is_selected(option), "{option}" }
                }
            }
        },
        BlockKind::FileUpload => rsx! {
            div { class: "response-file",
                input {
                    id: "response-input",
                    r#type: "file",
                    onchange: move |evt: FormEvent| {
                        if let Some(file) = evt.files().into_iter().next() {
                            on_input.call(AnswerInput::File(FileHandle {
                                name: file.name(),
                                size: file.size(),
                                content_type: file.content_type(),
                            }));
                        }
                    },
                }
                if let Some(name) = vm.answer.as_ref().and_then(Answer::file_handle).map(|f| f.name.clone()) {
                    p { class: "response-file-name", "{name}" }
                    button {
                        class: "response-file-clear",
                        r#type: "button",
                        onclick: move |_| on_input.call(AnswerInput::ClearFile),
                        "Remove"
                    }
                }
                if let Some(max) = vm.max_file_size_mb.as_ref() {
                    p { class: "response-file-limit", "Maximum file size: {max} MB" }
                }
            }
        },
        kind => rsx! {
            input {
                id: "response-input",
                class: "response-input",
                r#type: input_type(kind),
                placeholder: vm.placeholder.clone(),
                value: "{value}",
                oninput: move |evt| on_input.call(AnswerInput::Text(evt.value())),
            }
        },
    }
}

/// Renders the active block with its input, validation message and
/// navigation controls.
///
/// Input events become answers through `on_answer`. The primary action on
/// the block before thankYou fires `on_submit` instead of `on_intent`; hand
/// it to `ResponseFlowService::submit`, which validates before sending.
#[component]
pub fn ResponseBlockView(
    vm: ResponseBlockVm,
    on_answer: Option<EventHandler<(BlockId, Answer)>>,
    on_intent: Option<EventHandler<NavIntent>>,
    on_submit: Option<EventHandler<()>>,
) -> Element {
    let kind = vm.kind;
    let is_thank_you = vm.is_thank_you;
    let submits = vm.submits;

    let answer_vm = vm.clone();
    let on_input = use_callback(move |input: AnswerInput| {
        let Some(answer) = answer_vm.answer_for(input) else {
            tracing::debug!(block_id = %answer_vm.block_id, "input does not apply to block");
            return;
        };
        if let Some(handler) = on_answer {
            handler.call((BlockId::new(answer_vm.block_id.clone()), answer));
        }
    });

    #[cfg(test)]
    {
        let mut registered = use_signal(|| false);
        if !registered() {
            registered.set(true);
            if let Some(handles) = try_consume_context::<ResponseTestHandles>() {
                handles.register(on_input);
            }
        }
    }

    let on_keydown = move |evt: KeyboardEvent| {
        let Some(key) = nav_key(&evt.data.key()) else {
            return;
        };
        let modifiers = evt.data.modifiers();
        let press = KeyPress {
            key,
            shift: modifiers.contains(Modifiers::SHIFT),
            command: modifiers.contains(Modifiers::META) || modifiers.contains(Modifiers::CONTROL),
            in_textarea: kind == BlockKind::LongText,
        };
        let Some(intent) = intent_for_kind(kind, is_thank_you, press) else {
            return;
        };
        evt.prevent_default();
        tracing::debug!(?intent, "keyboard navigation");
        if intent == NavIntent::Next && submits {
            if let Some(handler) = on_submit {
                handler.call(());
            }
        } else if let Some(handler) = on_intent {
            handler.call(intent);
        }
    };

    let on_primary = move |_| {
        if submits {
            if let Some(handler) = on_submit {
                handler.call(());
            }
        } else if let Some(handler) = on_intent {
            handler.call(NavIntent::Next);
        }
    };

    let block_class = if kind == BlockKind::Statement {
        "response-block statement"
    } else {
        "response-block"
    };

    rsx! {
        div {
            class: "{block_class}",
            "data-block-id": "{vm.block_id}",
            tabindex: "0",
            onkeydown: on_keydown,
            div { class: "response-progress",
                div { class: "response-progress-bar", style: "width: {vm.progress_percent}%" }
            }
            h2 { class: "response-question",
                "{vm.label}"
                if vm.required {
                    span { class: "response-required", "*" }
                }
            }
            if let Some(help) = vm.help_text.as_ref() {
                p { class: "response-help", "{help}" }
            }
            {render_input(&vm, on_input)}
            if let Some(message) = vm.validation_message.as_ref() {
                div { class: "response-error", "role": "alert", "{message}" }
            }
            div { class: "response-actions",
                if let Some(url) = vm.continue_url.as_ref() {
                    a {
                        class: "response-primary",
                        href: "{url}",
                        target: "_blank",
                        rel: "noopener noreferrer",
                        "{vm.button_label}"
                    }
                } else {
                    button {
                        class: "response-primary",
                        r#type: "button",
                        onclick: on_primary,
                        "{vm.button_label}"
                    }
                }
                if let Some(hint) = vm.key_hint {
                    span { class: "response-hint", "press {hint} ↵" }
                }
            }
        }
    }
}

#[cfg(test)]
#[derive(Clone, Default)]
pub(crate) struct ResponseTestHandles {
    input: Rc<RefCell<Option<Callback<AnswerInput>>>>,
}

#[cfg(test)]
impl ResponseTestHandles {
    pub(crate) fn register(&self, input: Callback<AnswerInput>) {
        *self.input.borrow_mut() = Some(input);
    }

    pub(crate) fn input(&self) -> Callback<AnswerInput> {
        (*self.input.borrow()).expect("response input registered")
    }
}
