//! 「ゼロから作成」フォームとライブプレビュー
//!
//! 入力内容はバックエンドに送らない。HTMLとして手元に保存できるだけ。

use crate::preview;
use crate::toast::Toasts;
use leptos::prelude::*;
use resume_ai_common::resume_data::{EntryId, Education, Experience, PersonalField, Skill, SkillLevel};
use resume_ai_common::{ResumeContent, ResumeData};

const PERSONAL_FIELDS: [(PersonalField, &str, &str); 7] = [
    (PersonalField::FullName, "Full name *", "John Doe"),
    (PersonalField::Email, "Email *", "john@example.com"),
    (PersonalField::Phone, "Phone", "+1 (555) 123-4567"),
    (PersonalField::Location, "Location", "New York, NY"),
    (PersonalField::Linkedin, "LinkedIn", "linkedin.com/in/johndoe"),
    (PersonalField::Github, "GitHub", "github.com/johndoe"),
    (PersonalField::Website, "Website", "johndoe.dev"),
];

fn education_value(data: RwSignal<ResumeData>, id: EntryId, get: fn(&Education) -> String) -> Signal<String> {
    Signal::derive(move || data.with(|d| d.education.iter().find(|e| e.id == id).map(get).unwrap_or_default()))
}

fn edit_education(data: RwSignal<ResumeData>, id: EntryId, set: fn(&mut Education, String)) -> Callback<String> {
    Callback::new(move |value| {
        data.update(|d| {
            d.update_education(id, |e| set(e, value));
        })
    })
}

fn experience_value(data: RwSignal<ResumeData>, id: EntryId, get: fn(&Experience) -> String) -> Signal<String> {
    Signal::derive(move || data.with(|d| d.experience.iter().find(|e| e.id == id).map(get).unwrap_or_default()))
}

fn edit_experience(data: RwSignal<ResumeData>, id: EntryId, set: fn(&mut Experience, String)) -> Callback<String> {
    Callback::new(move |value| {
        data.update(|d| {
            d.update_experience(id, |e| set(e, value));
        })
    })
}

fn skill_value(data: RwSignal<ResumeData>, id: EntryId, get: fn(&Skill) -> String) -> Signal<String> {
    Signal::derive(move || data.with(|d| d.skills.iter().find(|s| s.id == id).map(get).unwrap_or_default()))
}

fn edit_skill(data: RwSignal<ResumeData>, id: EntryId, set: fn(&mut Skill, String)) -> Callback<String> {
    Callback::new(move |value| {
        data.update(|d| {
            d.update_skill(id, |s| set(s, value));
        })
    })
}

/// ラベル付きテキスト入力
#[component]
fn Field(
    label: &'static str,
    #[prop(into)] value: Signal<String>,
    on_input: Callback<String>,
    #[prop(optional)] placeholder: &'static str,
) -> impl IntoView {
    view! {
        <label class="field">
            <span>{label}</span>
            <input
                type="text"
                placeholder=placeholder
                prop:value=value
                on:input=move |ev| on_input.run(event_target_value(&ev))
            />
        </label>
    }
}

#[component]
pub fn ResumeForm() -> impl IntoView {
    let toasts = Toasts::use_context();
    let data = RwSignal::new(ResumeData::new());

    let save_html = move |_| {
        let missing = data.with_untracked(|d| d.missing_required());
        if !missing.is_empty() {
            toasts.warning(format!("Please fill in: {}", missing.join(", ")));
            return;
        }
        let html = data.with_untracked(|d| d.render_preview_html());
        match preview::download(&ResumeContent::html(html), "resume.html") {
            Ok(()) => toasts.success("Resume saved as HTML"),
            Err(e) => gloo::console::error!("download failed", e),
        }
    };

    view! {
        <div class="resume-form-layout">
            <form class="resume-form" on:submit=|ev: leptos::ev::SubmitEvent| ev.prevent_default()>
                <h3>"Personal Information"</h3>
                {PERSONAL_FIELDS
                    .into_iter()
                    .map(|(field, label, placeholder)| {
                        view! {
                            <Field
                                label=label
                                placeholder=placeholder
                                value=Signal::derive(move || data.with(|d| d.personal_info.get(field).to_string()))
                                on_input=Callback::new(move |value: String| data.update(|d| d.set_personal(field, value)))
                            />
                        }
                    })
                    .collect_view()}
                <label class="field">
                    <span>"Professional summary"</span>
                    <textarea
                        rows="4"
                        prop:value=move || data.with(|d| d.personal_info.summary.clone())
                        on:input=move |ev| data.update(|d| d.set_personal(PersonalField::Summary, event_target_value(&ev)))
                    ></textarea>
                </label>

                <div class="section-header">
                    <h3>"Experience"</h3>
                    <button type="button" class="btn btn-small" on:click=move |_| {
                        data.update(|d| {
                            d.add_experience();
                        })
                    }>
                        "+ Add"
                    </button>
                </div>
                <For
                    each=move || data.with(|d| d.experience.iter().map(|e| e.id).collect::<Vec<_>>())
                    key=|id| *id
                    children=move |id| {
                        view! {
                            <fieldset class="entry">
                                <Field
                                    label="Job title"
                                    value=experience_value(data, id, |e| e.title.clone())
                                    on_input=edit_experience(data, id, |e, v| e.title = v)
                                />
                                <Field
                                    label="Company"
                                    value=experience_value(data, id, |e| e.company.clone())
                                    on_input=edit_experience(data, id, |e, v| e.company = v)
                                />
                                <Field
                                    label="Location"
                                    value=experience_value(data, id, |e| e.location.clone())
                                    on_input=edit_experience(data, id, |e, v| e.location = v)
                                />
                                <Field
                                    label="Start date"
                                    placeholder="Jan 2020"
                                    value=experience_value(data, id, |e| e.start_date.clone())
                                    on_input=edit_experience(data, id, |e, v| e.start_date = v)
                                />
                                <Field
                                    label="End date"
                                    placeholder="Dec 2022"
                                    value=experience_value(data, id, |e| e.end_date.clone())
                                    on_input=edit_experience(data, id, |e, v| e.end_date = v)
                                />
                                <label class="checkbox">
                                    <input
                                        type="checkbox"
                                        prop:checked=move || {
                                            data.with(|d| d.experience.iter().any(|e| e.id == id && e.current))
                                        }
                                        on:change=move |ev| {
                                            let checked = event_target_checked(&ev);
                                            data.update(|d| {
                                                d.update_experience(id, |e| e.current = checked);
                                            })
                                        }
                                    />
                                    "I currently work here"
                                </label>
                                <label class="field">
                                    <span>"Description (one point per line)"</span>
                                    <textarea
                                        rows="4"
                                        prop:value=experience_value(data, id, Experience::description_text)
                                        on:input=move |ev| {
                                            let text = event_target_value(&ev);
                                            data.update(|d| {
                                                d.update_experience(id, |e| e.set_description_text(&text));
                                            })
                                        }
                                    ></textarea>
                                </label>
                                <button type="button" class="btn btn-small btn-danger" on:click=move |_| {
                                    data.update(|d| {
                                        d.remove_experience(id);
                                    })
                                }>
                                    "Remove"
                                </button>
                            </fieldset>
                        }
                    }
                />

                <div class="section-header">
                    <h3>"Education"</h3>
                    <button type="button" class="btn btn-small" on:click=move |_| {
                        data.update(|d| {
                            d.add_education();
                        })
                    }>
                        "+ Add"
                    </button>
                </div>
                <For
                    each=move || data.with(|d| d.education.iter().map(|e| e.id).collect::<Vec<_>>())
                    key=|id| *id
                    children=move |id| {
                        view! {
                            <fieldset class="entry">
                                <Field
                                    label="Degree"
                                    value=education_value(data, id, |e| e.degree.clone())
                                    on_input=edit_education(data, id, |e, v| e.degree = v)
                                />
                                <Field
                                    label="Institution"
                                    value=education_value(data, id, |e| e.institution.clone())
                                    on_input=edit_education(data, id, |e, v| e.institution = v)
                                />
                                <Field
                                    label="Location"
                                    value=education_value(data, id, |e| e.location.clone())
                                    on_input=edit_education(data, id, |e, v| e.location = v)
                                />
                                <Field
                                    label="Start date"
                                    value=education_value(data, id, |e| e.start_date.clone())
                                    on_input=edit_education(data, id, |e, v| e.start_date = v)
                                />
                                <Field
                                    label="End date"
                                    value=education_value(data, id, |e| e.end_date.clone())
                                    on_input=edit_education(data, id, |e, v| e.end_date = v)
                                />
                                <button type="button" class="btn btn-small btn-danger" on:click=move |_| {
                                    data.update(|d| {
                                        d.remove_education(id);
                                    })
                                }>
                                    "Remove"
                                </button>
                            </fieldset>
                        }
                    }
                />

                <div class="section-header">
                    <h3>"Skills"</h3>
                    <button type="button" class="btn btn-small" on:click=move |_| {
                        data.update(|d| {
                            d.add_skill();
                        })
                    }>
                        "+ Add"
                    </button>
                </div>
                <For
                    each=move || data.with(|d| d.skills.iter().map(|s| s.id).collect::<Vec<_>>())
                    key=|id| *id
                    children=move |id| {
                        view! {
                            <fieldset class="entry entry-inline">
                                <Field
                                    label="Skill"
                                    value=skill_value(data, id, |s| s.name.clone())
                                    on_input=edit_skill(data, id, |s, v| s.name = v)
                                />
                                <label class="field">
                                    <span>"Level"</span>
                                    <select
                                        prop:value=skill_value(data, id, |s| s.level.as_str().to_string())
                                        on:change=move |ev| {
                                            if let Ok(level) = event_target_value(&ev).parse::<SkillLevel>() {
                                                data.update(|d| {
                                                    d.update_skill(id, |s| s.level = level);
                                                })
                                            }
                                        }
                                    >
                                        {SkillLevel::ALL
                                            .into_iter()
                                            .map(|level| view! { <option value=level.as_str()>{level.as_str()}</option> })
                                            .collect_view()}
                                    </select>
                                </label>
                                <Field
                                    label="Category"
                                    value=skill_value(data, id, |s| s.category.clone())
                                    on_input=edit_skill(data, id, |s, v| s.category = v)
                                />
                                <button type="button" class="btn btn-small btn-danger" on:click=move |_| {
                                    data.update(|d| {
                                        d.remove_skill(id);
                                    })
                                }>
                                    "Remove"
                                </button>
                            </fieldset>
                        }
                    }
                />

                {move || {
                    let missing = data.with(|d| d.missing_required());
                    (!missing.is_empty())
                        .then(|| view! { <p class="form-hint">"Required: "{missing.join(", ")}</p> })
                }}
                <button type="button" class="btn btn-primary" on:click=save_html>"Save as HTML"</button>
            </form>

            <div class="live-preview" inner_html=move || data.with(|d| d.render_preview_html())></div>
        </div>
    }
}
